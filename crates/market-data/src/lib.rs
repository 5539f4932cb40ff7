use crate::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use configuration::DataSettings;
use core_types::{DateRange, PriceSeries};
use std::fmt;
use std::time::Duration;

pub mod binance;
pub mod cache;
pub mod error;
pub mod retry;

// --- Public API ---
pub use binance::BinanceClient;
pub use cache::CachedSource;
pub use retry::RetryingSource;

/// What to fetch: one symbol at one timeframe, optionally bounded in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub timeframe: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>, range: DateRange) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.symbol, self.timeframe, self.range())
    }
}

/// The generic, abstract interface for anything that can produce candles.
///
/// Retry and caching are layered on top as wrappers implementing the same trait, so the
/// optimizer and CLI never care where the bars came from.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetches the bars for `request`, sorted and clipped to its range.
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError>;
}

/// Builds the Binance source described by `[data]`: retrying, and cached when enabled.
pub fn source_from_settings(settings: &DataSettings) -> Result<Box<dyn CandleSource>, FetchError> {
    let client = BinanceClient::new(
        &settings.base_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    let retrying = RetryingSource::new(
        client,
        settings.max_retries,
        Duration::from_secs(settings.retry_delay_secs),
    );

    if settings.use_cache {
        Ok(Box::new(CachedSource::new(retrying, &settings.cache_dir)))
    } else {
        Ok(Box::new(retrying))
    }
}
