use serde::{Deserialize, Serialize};

/// Summary statistics for one strategy evaluation.
///
/// This struct is the final output of the `AnalyticsEngine` and is never mutated after
/// creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Bars holding a non-flat signal.
    pub total_trades: usize,
    /// Bars with a strictly positive realised profit.
    pub profitable_trades: usize,
    /// `profitable_trades / total_trades`, or 0 when there were no trades.
    pub win_rate: f64,
    /// Sum of per-bar fractional returns (not compounded).
    pub total_profit: f64,
    /// Largest peak-to-trough decline of the compounded equity curve, as a positive fraction.
    pub max_drawdown: f64,
    /// Length of the evaluated series.
    pub count_signals: usize,

    /// Bars where the signal changes into a non-flat position.
    pub entries: usize,
    /// Bars with a defined profit.
    pub evaluated_bars: usize,
}
