use crate::base::assemble;
use crate::error::StrategyError;
use crate::indicators::bollinger;
use crate::params::StrategyParams;
use crate::Strategy;
use configuration::BollingerParams;
use core_types::{PriceSeries, Signal, SignalSeries, StrategyId};

/// The Bollinger Bands mean-reversion strategy.
///
/// - Buy while the close is below the lower band (oversold).
/// - Sell while the close is above the upper band (overbought).
///
/// The condition is re-evaluated on every bar, so the signal can stay pinned for
/// consecutive bars.
#[derive(Debug, Clone)]
pub struct BollingerBandsStrategy {
    params: BollingerParams,
}

impl BollingerBandsStrategy {
    pub fn new(params: BollingerParams) -> Result<Self, StrategyError> {
        if params.period == 0 {
            return Err(StrategyError::InvalidParameters(
                "Bollinger period cannot be zero".to_string(),
            ));
        }
        if !params.num_std.is_finite() || params.num_std < 0.0 {
            return Err(StrategyError::InvalidParameters(format!(
                "Bollinger band width must be a non-negative number, got {}",
                params.num_std
            )));
        }

        Ok(Self { params })
    }
}

impl Strategy for BollingerBandsStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::BollingerBands
    }

    fn params(&self) -> StrategyParams {
        StrategyParams::BollingerBands(self.params)
    }

    fn warmup(&self) -> usize {
        self.params.period - 1
    }

    fn generate_signals(&self, series: &PriceSeries) -> Result<SignalSeries, StrategyError> {
        let closes = series.closes();
        let bands = bollinger(&closes, self.params.period, self.params.num_std)?;

        let signals: Vec<Signal> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                if close < bands.lower[i] {
                    Signal::Long
                } else if close > bands.upper[i] {
                    Signal::Short
                } else {
                    Signal::Flat
                }
            })
            .collect();

        tracing::debug!(
            symbol = series.symbol(),
            period = self.params.period,
            num_std = self.params.num_std,
            active = signals.iter().filter(|s| !s.is_flat()).count(),
            "BollingerBands: signals generated"
        );

        assemble(series, signals, self.warmup())
    }
}
