use crate::base::assemble;
use crate::error::StrategyError;
use crate::indicators::macd;
use crate::params::StrategyParams;
use crate::Strategy;
use configuration::MacdParams;
use core_types::{PriceSeries, Signal, SignalSeries, StrategyId};

/// The MACD crossover strategy.
///
/// Unlike the level-based strategies this one fires only on the bar where the MACD
/// line crosses its signal line; every other bar is flat.
#[derive(Debug, Clone)]
pub struct MacdStrategy {
    params: MacdParams,
}

impl MacdStrategy {
    pub fn new(params: MacdParams) -> Result<Self, StrategyError> {
        if params.fast_period == 0 || params.slow_period == 0 || params.signal_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "MACD periods cannot be zero".to_string(),
            ));
        }

        Ok(Self { params })
    }
}

impl Strategy for MacdStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::Macd
    }

    fn params(&self) -> StrategyParams {
        StrategyParams::Macd(self.params)
    }

    fn warmup(&self) -> usize {
        // First bar whose predecessor already has a valid signal line.
        self.params.fast_period.max(self.params.slow_period) + self.params.signal_period - 1
    }

    fn generate_signals(&self, series: &PriceSeries) -> Result<SignalSeries, StrategyError> {
        let lines = macd(
            &series.closes(),
            self.params.fast_period,
            self.params.slow_period,
            self.params.signal_period,
        )?;

        let mut signals = vec![Signal::Flat; series.len()];
        for t in 1..series.len() {
            let (prev_macd, prev_signal) = (lines.macd[t - 1], lines.signal[t - 1]);
            let (macd, signal) = (lines.macd[t], lines.signal[t]);

            let is_bullish_cross = prev_macd <= prev_signal && macd > signal;
            let is_bearish_cross = prev_macd >= prev_signal && macd < signal;

            if is_bullish_cross {
                signals[t] = Signal::Long;
            } else if is_bearish_cross {
                signals[t] = Signal::Short;
            }
        }

        tracing::debug!(
            symbol = series.symbol(),
            crosses = signals.iter().filter(|s| !s.is_flat()).count(),
            "Macd: signals generated"
        );

        assemble(series, signals, self.warmup())
    }
}
