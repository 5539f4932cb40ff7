use crate::error::FetchError;
use crate::{CandleSource, FetchRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{Bar, PriceSeries};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk layout of a cached series.
#[derive(Serialize, Deserialize)]
struct CacheFile {
    symbol: String,
    timeframe: String,
    bars: Vec<Bar>,
}

/// Serves repeated requests from JSON files, falling back to the wrapped source.
///
/// Entries are keyed by symbol, timeframe and the range truncated to the hour, so two
/// requests within the same hours share an entry.
pub struct CachedSource<S> {
    inner: S,
    dir: PathBuf,
}

impl<S: CandleSource> CachedSource<S> {
    pub fn new(inner: S, dir: impl AsRef<Path>) -> Self {
        Self {
            inner,
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, request: &FetchRequest) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(request)))
    }

    /// A missing or unreadable entry is a miss, never an error.
    async fn load(&self, path: &Path) -> Option<PriceSeries> {
        let bytes = tokio::fs::read(path).await.ok()?;
        let parsed = serde_json::from_slice::<CacheFile>(&bytes)
            .map_err(|e| e.to_string())
            .and_then(|file| {
                PriceSeries::new(file.symbol, file.timeframe, file.bars).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(series) => Some(series),
            Err(reason) => {
                tracing::warn!(path = %path.display(), reason = %reason, "Ignoring corrupt cache entry");
                None
            }
        }
    }

    async fn store(&self, path: &Path, series: &PriceSeries) -> Result<(), FetchError> {
        let cache_error = |reason: String| FetchError::Cache {
            path: path.to_path_buf(),
            reason,
        };
        let file = CacheFile {
            symbol: series.symbol().to_string(),
            timeframe: series.timeframe().to_string(),
            bars: series.bars().to_vec(),
        };
        let bytes = serde_json::to_vec(&file).map_err(|e| cache_error(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| cache_error(e.to_string()))?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| cache_error(e.to_string()))
    }
}

#[async_trait]
impl<S: CandleSource> CandleSource for CachedSource<S> {
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        let path = self.path_for(request);
        if let Some(series) = self.load(&path).await {
            tracing::debug!(request = %request, path = %path.display(), "Cache hit");
            return Ok(series);
        }

        let series = self.inner.fetch(request).await?;
        self.store(&path, &series).await?;
        tracing::debug!(request = %request, path = %path.display(), bars = series.len(), "Cached fetched series");
        Ok(series)
    }
}

/// `symbol-timeframe-start-end` with hour-resolution timestamps, slugified to `[a-z0-9_]`.
pub fn cache_key(request: &FetchRequest) -> String {
    let hour = |t: Option<DateTime<Utc>>| {
        t.map(|t| t.format("%Y%m%d%H").to_string())
            .unwrap_or_else(|| "none".to_string())
    };
    let raw = format!(
        "{}-{}-{}-{}",
        request.symbol,
        request.timeframe,
        hour(request.start),
        hour(request.end)
    );
    slugify(&raw)
}

fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}
