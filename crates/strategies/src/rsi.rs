use crate::base::assemble;
use crate::error::StrategyError;
use crate::indicators::rsi;
use crate::params::StrategyParams;
use crate::Strategy;
use configuration::RsiParams;
use core_types::{PriceSeries, Signal, SignalSeries, StrategyId};

/// The RSI overbought/oversold strategy.
///
/// Long while RSI is below `oversold`, short while it is above `overbought`.
#[derive(Debug, Clone)]
pub struct RsiStrategy {
    params: RsiParams,
}

impl RsiStrategy {
    pub fn new(params: RsiParams) -> Result<Self, StrategyError> {
        if params.period == 0 {
            return Err(StrategyError::InvalidParameters(
                "RSI period cannot be zero".to_string(),
            ));
        }
        if params.oversold.is_nan() || params.overbought.is_nan() {
            return Err(StrategyError::InvalidParameters(
                "RSI thresholds must be numbers".to_string(),
            ));
        }

        Ok(Self { params })
    }
}

impl Strategy for RsiStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::Rsi
    }

    fn params(&self) -> StrategyParams {
        StrategyParams::Rsi(self.params)
    }

    fn warmup(&self) -> usize {
        self.params.period - 1
    }

    fn generate_signals(&self, series: &PriceSeries) -> Result<SignalSeries, StrategyError> {
        let values = rsi(&series.closes(), self.params.period)?;

        let signals = values
            .iter()
            .map(|&r| {
                if r < self.params.oversold {
                    Signal::Long
                } else if r > self.params.overbought {
                    Signal::Short
                } else {
                    Signal::Flat
                }
            })
            .collect();

        tracing::debug!(
            symbol = series.symbol(),
            period = self.params.period,
            "Rsi: signals generated"
        );

        assemble(series, signals, self.warmup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::series_from_closes;

    fn strategy() -> RsiStrategy {
        RsiStrategy::new(RsiParams { period: 2, overbought: 70.0, oversold: 30.0 }).unwrap()
    }

    #[test]
    fn pure_uptrend_never_buys() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = strategy().generate_signals(&series_from_closes(&closes)).unwrap();

        assert!(out.signals().iter().all(|&s| s != Signal::Long));
        assert!(out.signals().iter().any(|&s| s == Signal::Short));
    }

    #[test]
    fn pure_downtrend_never_sells() {
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
        let out = strategy().generate_signals(&series_from_closes(&closes)).unwrap();

        assert!(out.signals().iter().all(|&s| s != Signal::Short));
        assert!(out.signals().iter().any(|&s| s == Signal::Long));
    }

    #[test]
    fn warmup_bars_are_flat() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let out = strategy().generate_signals(&series_from_closes(&closes)).unwrap();
        assert!(out.signals()[0].is_flat());
        assert_eq!(out.signals()[1], Signal::Short);
        assert!(out.points()[..=1].iter().all(|p| p.profit.is_none()));
        assert!(out.points()[2].profit.is_some());
    }

    #[test]
    fn flat_prices_read_as_overbought() {
        let out = strategy().generate_signals(&series_from_closes(&[5.0; 6])).unwrap();
        assert!(out.signals()[1..].iter().all(|&s| s == Signal::Short));
    }

    #[test]
    fn threshold_boundary_stays_flat() {
        // RSI reads exactly 50 on bar 2, then 83.3 on bar 3.
        let params = RsiParams { period: 2, overbought: 83.4, oversold: 50.0 };
        let out = RsiStrategy::new(params)
            .unwrap()
            .generate_signals(&series_from_closes(&[1.0, 2.0, 1.5, 2.5]))
            .unwrap();
        assert_eq!(out.signals(), vec![Signal::Flat, Signal::Short, Signal::Flat, Signal::Flat]);
    }

    #[test]
    fn signals_do_not_depend_on_price_level() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + 10.0 * (i as f64 / 4.0).sin() + 3.0 * (i as f64 / 1.7).cos())
            .collect();
        let scaled: Vec<f64> = closes.iter().map(|c| c * 1e-4).collect();
        let rsi = RsiStrategy::new(RsiParams { period: 14, overbought: 70.0, oversold: 30.0 })
            .unwrap();

        let a = rsi.generate_signals(&series_from_closes(&closes)).unwrap();
        let b = rsi.generate_signals(&series_from_closes(&scaled)).unwrap();
        assert_eq!(a.signals(), b.signals());
    }
}
