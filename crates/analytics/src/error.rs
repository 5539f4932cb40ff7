use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Non-finite profit {value} at bar {index}")]
    NonFiniteProfit { index: usize, value: f64 },
}
