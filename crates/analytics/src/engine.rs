use crate::error::AnalyticsError;
use crate::report::PerformanceMetrics;
use core_types::{Signal, SignalSeries};

/// A stateless calculator for deriving performance metrics from a signal series.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `series` - The per-bar signals and lagged profits produced by a strategy.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceMetrics` or an `AnalyticsError` when a profit
    /// is not a finite number.
    pub fn calculate(&self, series: &SignalSeries) -> Result<PerformanceMetrics, AnalyticsError> {
        let mut metrics = PerformanceMetrics {
            count_signals: series.len(),
            ..PerformanceMetrics::default()
        };

        self.calculate_trades(series, &mut metrics);
        let profits = self.defined_profits(series)?;
        self.calculate_profitability(&profits, &mut metrics);
        self.calculate_drawdown(&profits, &mut metrics);

        tracing::debug!(
            bars = metrics.count_signals,
            trades = metrics.total_trades,
            total_profit = metrics.total_profit,
            max_drawdown = metrics.max_drawdown,
            "Metrics calculated"
        );
        Ok(metrics)
    }

    /// Counts bars in a position and transitions into one.
    fn calculate_trades(&self, series: &SignalSeries, metrics: &mut PerformanceMetrics) {
        let mut previous = Signal::Flat;
        for point in series {
            if !point.signal.is_flat() {
                metrics.total_trades += 1;
                if point.signal != previous {
                    metrics.entries += 1;
                }
            }
            previous = point.signal;
        }
    }

    /// Collects the defined profits, rejecting NaN and infinities.
    fn defined_profits(&self, series: &SignalSeries) -> Result<Vec<f64>, AnalyticsError> {
        series
            .iter()
            .enumerate()
            .filter_map(|(index, point)| point.profit.map(|p| (index, p)))
            .map(|(index, value)| {
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(AnalyticsError::NonFiniteProfit { index, value })
                }
            })
            .collect()
    }

    fn calculate_profitability(&self, profits: &[f64], metrics: &mut PerformanceMetrics) {
        metrics.evaluated_bars = profits.len();
        metrics.profitable_trades = profits.iter().filter(|&&p| p > 0.0).count();
        metrics.total_profit = profits.iter().sum();

        // A profitable bar always holds a position, so this stays within [0, 1].
        if metrics.total_trades > 0 {
            metrics.win_rate =
                (metrics.profitable_trades as f64 / metrics.total_trades as f64).min(1.0);
        }
    }

    /// Maximum drawdown of the compounded equity curve `Π(1 + profit)`.
    fn calculate_drawdown(&self, profits: &[f64], metrics: &mut PerformanceMetrics) {
        if profits.len() < 2 {
            return;
        }

        // The peak is taken over the curve itself, so a loss on the first bar is not a drawdown.
        let mut equity = 1.0_f64;
        let mut peak = f64::NEG_INFINITY;
        let mut worst = 0.0_f64;
        for profit in profits {
            equity *= 1.0 + profit;
            if equity > peak {
                peak = equity;
            }
            let drawdown = equity / peak - 1.0;
            if drawdown < worst {
                worst = drawdown;
            }
        }

        metrics.max_drawdown = worst.abs();
    }
}
