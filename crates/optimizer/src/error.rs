use core_types::DateRange;
use indicatif::style::TemplateError;
use serde_json::Error as JsonError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Parameter generation failed: {0}")]
    ParameterGeneration(String),

    #[error("Failed to fetch {symbol} {timeframe} over {range}: {source}")]
    DataFetch {
        symbol: String,
        timeframe: String,
        range: DateRange,
        #[source]
        source: BoxError,
    },

    #[error("No price data available for {symbol} {timeframe}")]
    DataUnavailable { symbol: String, timeframe: String },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] JsonError),
}

impl From<TemplateError> for OptimizerError {
    fn from(error: TemplateError) -> Self {
        OptimizerError::ProgressBarTemplate(error.to_string())
    }
}
