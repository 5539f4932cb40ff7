use crate::base::{assemble, level_signal};
use crate::error::StrategyError;
use crate::indicators::sma;
use crate::params::StrategyParams;
use crate::Strategy;
use configuration::MACrossoverParams;
use core_types::{PriceSeries, SignalSeries, StrategyId};

/// The Moving Average Crossover strategy.
///
/// Holds long while the fast SMA is above the slow SMA and short while it is below.
/// This is a level rule: the signal stays non-flat for as long as the ordering holds.
#[derive(Debug, Clone)]
pub struct MACrossover {
    params: MACrossoverParams,
}

impl MACrossover {
    /// Creates a new `MACrossover` instance with the given parameters.
    pub fn new(params: MACrossoverParams) -> Result<Self, StrategyError> {
        if params.fast_period == 0 || params.slow_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "MA periods cannot be zero".to_string(),
            ));
        }

        Ok(Self { params })
    }
}

impl Strategy for MACrossover {
    fn id(&self) -> StrategyId {
        StrategyId::MaCrossover
    }

    fn params(&self) -> StrategyParams {
        StrategyParams::MaCrossover(self.params)
    }

    fn warmup(&self) -> usize {
        self.params.fast_period.max(self.params.slow_period) - 1
    }

    fn generate_signals(&self, series: &PriceSeries) -> Result<SignalSeries, StrategyError> {
        let closes = series.closes();
        let fast = sma(&closes, self.params.fast_period)?;
        let slow = sma(&closes, self.params.slow_period)?;

        let signals = fast
            .iter()
            .zip(&slow)
            .map(|(&f, &s)| level_signal(f, s))
            .collect();

        tracing::debug!(
            symbol = series.symbol(),
            fast = self.params.fast_period,
            slow = self.params.slow_period,
            bars = closes.len(),
            "MACrossover: signals generated"
        );

        assemble(series, signals, self.warmup())
    }
}
