use crate::error::StrategyError;
use core_types::{PriceSeries, Signal, SignalPoint, SignalSeries};

/// Maps each bar to a signal from a comparison of two indicator values.
///
/// `Long` when `a > b`, `Short` when `a < b`, `Flat` otherwise (including whenever
/// either side is still `NaN`).
pub(crate) fn level_signal(a: f64, b: f64) -> Signal {
    if a > b {
        Signal::Long
    } else if a < b {
        Signal::Short
    } else {
        Signal::Flat
    }
}

/// Attaches realised profits to per-bar signals.
///
/// The decision taken on bar `t-1` can only be acted on at bar `t`, so
/// `profit[t] = signal[t-1] * (close[t] / close[t-1] - 1)`. Bars `0..=warmup` carry no
/// profit because the signal feeding them is not backed by valid indicator values.
pub(crate) fn assemble(
    series: &PriceSeries,
    signals: Vec<Signal>,
    warmup: usize,
) -> Result<SignalSeries, StrategyError> {
    let bars = series.bars();
    if signals.len() != bars.len() {
        return Err(StrategyError::IndicatorError(format!(
            "signal count {} does not match bar count {}",
            signals.len(),
            bars.len()
        )));
    }

    let mut points = Vec::with_capacity(bars.len());
    for (t, (bar, &signal)) in bars.iter().zip(&signals).enumerate() {
        let profit = if t > warmup {
            let prev_close = bars[t - 1].close;
            if prev_close <= 0.0 {
                return Err(StrategyError::IndicatorError(format!(
                    "non-positive close {} at {} makes the bar return undefined",
                    prev_close,
                    bars[t - 1].timestamp
                )));
            }
            Some(signals[t - 1].direction() * (bar.close / prev_close - 1.0))
        } else {
            None
        };

        points.push(SignalPoint {
            timestamp: bar.timestamp,
            price: bar.close,
            signal,
            profit,
        });
    }

    Ok(SignalSeries::new(points, warmup))
}
