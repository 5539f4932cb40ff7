use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network failure, timeout, rate limit or server-side error. Worth retrying.
    #[error("HTTP request for {context} failed: {reason}")]
    Http { context: String, reason: String },

    #[error("The exchange rejected the request for {context}: [{code}] {message}")]
    Api {
        context: String,
        code: i64,
        message: String,
    },

    #[error("Invalid data format from API for {context}: {reason}")]
    InvalidData { context: String, reason: String },

    #[error("Cache error at {}: {reason}", path.display())]
    Cache { path: PathBuf, reason: String },

    #[error("No candles returned for {context}")]
    Empty { context: String },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Http { .. })
    }
}
