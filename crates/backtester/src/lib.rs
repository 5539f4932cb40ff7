use crate::error::BacktestError;
use analytics::{AnalyticsEngine, PerformanceMetrics};
use configuration::Strategies;
use core_types::{PriceSeries, SignalSeries, StrategyId};
use std::sync::Arc;
use strategies::{Strategy, StrategyParams};

pub mod error;

/// Binds one strategy to one price series and evaluates it.
///
/// The series is shared behind an `Arc` so that many backtests (e.g. one per grid-search
/// candidate) can read the same bars without copying them.
pub struct Backtester {
    // --- Components ---
    strategy: Box<dyn Strategy>,
    analytics_engine: AnalyticsEngine,
    // --- Data ---
    data: Option<Arc<PriceSeries>>,
}

impl Backtester {
    /// Constructs a new `Backtester` with no data attached.
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self {
            strategy,
            analytics_engine: AnalyticsEngine::new(),
            data: None,
        }
    }

    /// Builds the strategy for `id` from its configured defaults.
    pub fn from_config(id: StrategyId, strategies: &Strategies) -> Result<Self, BacktestError> {
        Ok(Self::new(strategies::create_strategy(id, strategies)?))
    }

    /// Builds the strategy from an explicit parameter set.
    pub fn from_params(params: StrategyParams) -> Result<Self, BacktestError> {
        Ok(Self::new(strategies::build_strategy(params)?))
    }

    /// Attaches (or replaces) the price series to evaluate against.
    pub fn set_data(&mut self, data: Arc<PriceSeries>) {
        tracing::debug!(
            strategy = %self.strategy.id(),
            symbol = data.symbol(),
            timeframe = data.timeframe(),
            bars = data.len(),
            "Price series attached"
        );
        self.data = Some(data);
    }

    pub fn with_data(mut self, data: Arc<PriceSeries>) -> Self {
        self.set_data(data);
        self
    }

    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    pub fn data(&self) -> Option<&PriceSeries> {
        self.data.as_deref()
    }

    /// Runs the strategy over the attached series.
    pub fn generate_signals(&self) -> Result<SignalSeries, BacktestError> {
        let data = self.require_data()?;
        Ok(self.strategy.generate_signals(data)?)
    }

    /// Runs the strategy and reduces its signals into summary metrics.
    pub fn get_performance_metrics(&self) -> Result<PerformanceMetrics, BacktestError> {
        let signals = self.generate_signals()?;
        Ok(self.analytics_engine.calculate(&signals)?)
    }

    fn require_data(&self) -> Result<&PriceSeries, BacktestError> {
        self.data
            .as_deref()
            .ok_or_else(|| BacktestError::NoData(self.strategy.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use configuration::MACrossoverParams;
    use core_types::Bar;

    fn series(closes: &[f64]) -> Arc<PriceSeries> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::minutes(15 * i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 5.0,
            })
            .collect();
        Arc::new(PriceSeries::new("ETH/USDT", "15m", bars).unwrap())
    }

    fn ma_cross() -> Backtester {
        Backtester::from_params(StrategyParams::MaCrossover(MACrossoverParams {
            fast_period: 2,
            slow_period: 3,
        }))
        .unwrap()
    }

    #[test]
    fn metrics_without_data_is_a_configuration_error() {
        let backtester = ma_cross();
        assert_eq!(
            backtester.get_performance_metrics().unwrap_err(),
            BacktestError::NoData(StrategyId::MaCrossover)
        );
        assert!(backtester.generate_signals().is_err());
    }

    #[test]
    fn metrics_reflect_the_attached_series() {
        let backtester = ma_cross().with_data(series(&[10.0, 11.0, 12.0, 13.0, 11.0, 10.0, 9.0]));
        let metrics = backtester.get_performance_metrics().unwrap();

        // Long on bars 2-3, short on bars 5-6.
        assert_eq!(metrics.total_trades, 4);
        assert_eq!(metrics.entries, 2);
        assert_eq!(metrics.count_signals, 7);
        assert!(metrics.win_rate >= 0.0 && metrics.win_rate <= 1.0);
        assert!(metrics.max_drawdown > 0.0);
    }

    #[test]
    fn single_bar_series_yields_empty_metrics() {
        for id in StrategyId::ALL {
            let backtester = Backtester::from_config(id, &Strategies::default())
                .unwrap()
                .with_data(series(&[42.0]));
            let metrics = backtester.get_performance_metrics().unwrap();
            assert_eq!(metrics.total_trades, 0, "{}", id);
            assert_eq!(metrics.win_rate, 0.0);
            assert_eq!(metrics.max_drawdown, 0.0);
        }
    }

    #[test]
    fn replacing_data_changes_the_result() {
        let mut backtester = ma_cross().with_data(series(&[10.0, 11.0, 12.0, 13.0]));
        let rising = backtester.get_performance_metrics().unwrap();
        backtester.set_data(series(&[13.0, 12.0, 11.0, 10.0]));
        let falling = backtester.get_performance_metrics().unwrap();
        assert_eq!(rising.total_trades, 2);
        assert_eq!(falling.total_trades, 2);
        assert!(backtester.data().is_some_and(|d| d.closes()[0] == 13.0));
    }
}
