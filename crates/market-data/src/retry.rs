use crate::error::FetchError;
use crate::{CandleSource, FetchRequest};
use async_trait::async_trait;
use core_types::PriceSeries;
use std::time::Duration;

/// Retries transient failures of the wrapped source with a fixed delay.
pub struct RetryingSource<S> {
    inner: S,
    max_attempts: u32,
    delay: Duration,
}

impl<S: CandleSource> RetryingSource<S> {
    /// `max_attempts` counts the first request too; zero is treated as one.
    pub fn new(inner: S, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

#[async_trait]
impl<S: CandleSource> CandleSource for RetryingSource<S> {
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch(request).await {
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        request = %request,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Fetch failed. Retrying in {:?}...",
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
