//! Full-length indicator series built from the `ta` crate's streaming indicators.
//!
//! Every function returns one value per input element. Values inside an indicator's
//! warm-up window are `NaN`, so comparisons against them are always false and the
//! strategies naturally stay flat until enough history exists.

use crate::error::StrategyError;
use ta::errors::TaError;
use ta::indicators::{
    ExponentialMovingAverage as Ema, Maximum, Minimum, SimpleMovingAverage as Sma,
    StandardDeviation,
};
use ta::Next;

fn init_error(name: &str, e: TaError) -> StrategyError {
    StrategyError::IndicatorError(format!("Failed to initialize {}: {:?}", name, e))
}

/// Replaces the first `warmup` values with `NaN`.
fn mask_warmup(mut values: Vec<f64>, warmup: usize) -> Vec<f64> {
    let end = warmup.min(values.len());
    values[..end].iter_mut().for_each(|v| *v = f64::NAN);
    values
}

/// An EMA with smoothing factor `1 / period`, i.e. Wilder's moving average.
///
/// `ta` derives the factor as `2 / (n + 1)`, so `n = 2 * period - 1`.
fn wilder(period: usize) -> Result<Ema, TaError> {
    Ema::new(period.saturating_mul(2).saturating_sub(1))
}

/// Simple moving average, valid from index `period - 1`.
pub fn sma(values: &[f64], period: usize) -> Result<Vec<f64>, StrategyError> {
    let mut sma = Sma::new(period).map_err(|e| init_error("SMA", e))?;
    let out = values.iter().map(|&v| sma.next(v)).collect();
    Ok(mask_warmup(out, period - 1))
}

/// Upper and lower bands `num_std` standard deviations either side of a rolling mean.
#[derive(Debug, Clone)]
pub struct Bands {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bollinger bands over `period` bars, using the sample standard deviation.
///
/// A one-bar window has no sample deviation, so both bands are `NaN` throughout.
pub fn bollinger(values: &[f64], period: usize, num_std: f64) -> Result<Bands, StrategyError> {
    let mut mean = Sma::new(period).map_err(|e| init_error("Bollinger Bands", e))?;
    let mut sd = StandardDeviation::new(period).map_err(|e| init_error("Bollinger Bands", e))?;

    // `ta` reports the population deviation; rescale it to divide by `period - 1`.
    let sample_scale = if period > 1 {
        (period as f64 / (period - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    let mut upper = Vec::with_capacity(values.len());
    let mut lower = Vec::with_capacity(values.len());
    for &v in values {
        let average = mean.next(v);
        let width = sd.next(v) * sample_scale * num_std;
        upper.push(average + width);
        lower.push(average - width);
    }

    let warmup = period - 1;
    Ok(Bands {
        upper: mask_warmup(upper, warmup),
        lower: mask_warmup(lower, warmup),
    })
}

/// Relative Strength Index with Wilder smoothing, valid from index `period - 1`.
///
/// The first bar has no predecessor and contributes a zero change. A bar whose
/// average loss is zero reads 100.
pub fn rsi(values: &[f64], period: usize) -> Result<Vec<f64>, StrategyError> {
    let mut gains = wilder(period).map_err(|e| init_error("RSI", e))?;
    let mut losses = wilder(period).map_err(|e| init_error("RSI", e))?;

    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let change = prev.map_or(0.0, |p| v - p);
        prev = Some(v);

        let avg_gain = gains.next(change.max(0.0));
        let avg_loss = losses.next((-change).max(0.0));
        let value = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        out.push(value);
    }
    Ok(mask_warmup(out, period - 1))
}

/// The MACD line and its signal line.
#[derive(Debug, Clone)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// MACD over exponential moving averages.
///
/// The MACD line is valid once the slower EMA has `max(fast, slow)` samples. The signal
/// EMA starts from the first valid MACD value and needs a further `signal - 1` values.
pub fn macd(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdLines, StrategyError> {
    let mut fast_ema = Ema::new(fast).map_err(|e| init_error("MACD", e))?;
    let mut slow_ema = Ema::new(slow).map_err(|e| init_error("MACD", e))?;
    let mut signal_ema = Ema::new(signal).map_err(|e| init_error("MACD", e))?;

    let line_warmup = fast.max(slow) - 1;
    let mut macd = Vec::with_capacity(values.len());
    let mut signal_line = Vec::with_capacity(values.len());
    for (t, &v) in values.iter().enumerate() {
        let line = fast_ema.next(v) - slow_ema.next(v);
        macd.push(line);
        signal_line.push(if t >= line_warmup {
            signal_ema.next(line)
        } else {
            f64::NAN
        });
    }

    Ok(MacdLines {
        macd: mask_warmup(macd, line_warmup),
        signal: mask_warmup(signal_line, line_warmup + signal - 1),
    })
}

/// `(highest high + lowest low) / 2` over a rolling window, valid from index `period - 1`.
pub fn rolling_midpoint(
    highs: &[f64],
    lows: &[f64],
    period: usize,
) -> Result<Vec<f64>, StrategyError> {
    if highs.len() != lows.len() {
        return Err(StrategyError::IndicatorError(format!(
            "high/low length mismatch: {} vs {}",
            highs.len(),
            lows.len()
        )));
    }
    let mut max = Maximum::new(period).map_err(|e| init_error("Maximum", e))?;
    let mut min = Minimum::new(period).map_err(|e| init_error("Minimum", e))?;

    let out = highs
        .iter()
        .zip(lows)
        .map(|(&h, &l)| (max.next(h) + min.next(l)) / 2.0)
        .collect();
    Ok(mask_warmup(out, period - 1))
}

/// All five Ichimoku lines, aligned with the input bars.
#[derive(Debug, Clone)]
pub struct IchimokuLines {
    pub tenkan: Vec<f64>,
    pub kijun: Vec<f64>,
    pub senkou_a: Vec<f64>,
    pub senkou_b: Vec<f64>,
    /// `close[t + displacement]`, i.e. the close `displacement` bars ahead of `t`.
    pub chikou: Vec<f64>,
}

/// Ichimoku lines. The Senkou spans are reported unshifted.
pub fn ichimoku(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    tenkan_period: usize,
    kijun_period: usize,
    senkou_span_b_period: usize,
    displacement: usize,
) -> Result<IchimokuLines, StrategyError> {
    let tenkan = rolling_midpoint(highs, lows, tenkan_period)?;
    let kijun = rolling_midpoint(highs, lows, kijun_period)?;
    let senkou_b = rolling_midpoint(highs, lows, senkou_span_b_period)?;

    // NaN propagates, so span A is undefined until both of its inputs are.
    let senkou_a = tenkan.iter().zip(&kijun).map(|(t, k)| (t + k) / 2.0).collect();

    let chikou = (0..closes.len())
        .map(|t| closes.get(t + displacement).copied().unwrap_or(f64::NAN))
        .collect();

    Ok(IchimokuLines { tenkan, kijun, senkou_a, senkou_b, chikou })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn sma_masks_warmup_and_averages_window() {
        let out = sma(&[10.0, 11.0, 12.0, 13.0], 3).unwrap();
        assert!(out[0].is_nan() && out[1].is_nan());
        assert!((out[2] - 11.0).abs() < EPS);
        assert!((out[3] - 12.0).abs() < EPS);
    }

    #[test]
    fn zero_period_is_an_indicator_error() {
        assert!(matches!(sma(&[1.0], 0), Err(StrategyError::IndicatorError(_))));
        assert!(matches!(rsi(&[1.0], 0), Err(StrategyError::IndicatorError(_))));
    }

    #[test]
    fn short_input_is_entirely_warmup() {
        let out = sma(&[1.0, 2.0], 5).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn bollinger_bands_use_sample_deviation() {
        // Mean 11, sample variance (1 + 1 + 4) / 2 = 3.
        let bands = bollinger(&[10.0, 10.0, 13.0], 3, 1.0).unwrap();
        assert!(bands.upper[1].is_nan() && bands.lower[1].is_nan());
        assert!((bands.upper[2] - (11.0 + 3f64.sqrt())).abs() < EPS);
        assert!((bands.lower[2] - (11.0 - 3f64.sqrt())).abs() < EPS);
    }

    #[test]
    fn single_bar_bollinger_window_has_no_bands() {
        let bands = bollinger(&[1.0, 2.0, 3.0], 1, 2.0).unwrap();
        assert!(bands.upper.iter().chain(&bands.lower).all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_matches_wilder_smoothing() {
        // Changes 0, +1, -0.5, +1 smoothed with alpha = 1/2.
        // Gains 0, 0.5, 0.25, 0.625; losses 0, 0, 0.25, 0.125.
        let out = rsi(&[1.0, 2.0, 1.5, 2.5], 2).unwrap();
        assert!(out[0].is_nan());
        assert!((out[1] - 100.0).abs() < EPS);
        assert!((out[2] - 50.0).abs() < EPS);
        assert!((out[3] - (100.0 - 100.0 / 6.0)).abs() < EPS);
    }

    #[test]
    fn rsi_does_not_depend_on_price_level() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + 10.0 * (i as f64 / 4.0).sin())
            .collect();
        let scaled: Vec<f64> = closes.iter().map(|c| c * 1e-4).collect();

        let a = rsi(&closes, 14).unwrap();
        let b = rsi(&scaled, 14).unwrap();
        for (x, y) in a.iter().zip(&b).skip(13) {
            assert!((x - y).abs() < 1e-6, "{} vs {}", x, y);
        }
    }

    #[test]
    fn macd_signal_starts_from_first_valid_macd_value() {
        let values: Vec<f64> = (0..12).map(|i| 100.0 + (i * i) as f64).collect();
        let lines = macd(&values, 2, 4, 2).unwrap();
        // Signal EMA over two values: k = 2/3, seeded at index 3.
        let expected = (2.0 / 3.0) * lines.macd[4] + (1.0 / 3.0) * lines.macd[3];
        assert!(lines.signal[3].is_nan());
        assert!((lines.signal[4] - expected).abs() < EPS);
    }

    #[test]
    fn rolling_midpoint_uses_extremes_of_window() {
        let highs = [5.0, 7.0, 6.0, 4.0];
        let lows = [1.0, 2.0, 3.0, 2.0];
        let out = rolling_midpoint(&highs, &lows, 2).unwrap();
        assert!(out[0].is_nan());
        assert!((out[1] - (7.0 + 1.0) / 2.0).abs() < EPS);
        assert!((out[2] - (7.0 + 2.0) / 2.0).abs() < EPS);
        assert!((out[3] - (6.0 + 2.0) / 2.0).abs() < EPS);
    }

    #[test]
    fn chikou_looks_ahead_by_displacement() {
        let closes = [1.0, 2.0, 3.0, 4.0];
        let lines = ichimoku(&closes, &closes, &closes, 1, 2, 3, 2).unwrap();
        assert_eq!(lines.chikou[0], 3.0);
        assert_eq!(lines.chikou[1], 4.0);
        assert!(lines.chikou[2].is_nan() && lines.chikou[3].is_nan());
    }

    #[test]
    fn macd_signal_line_warms_up_after_macd_line() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let lines = macd(&values, 3, 5, 4).unwrap();
        assert!(lines.macd[3].is_nan() && !lines.macd[4].is_nan());
        assert!(lines.signal[6].is_nan() && !lines.signal[7].is_nan());
    }
}
