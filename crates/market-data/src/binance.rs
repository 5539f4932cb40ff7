use crate::error::FetchError;
use crate::{CandleSource, FetchRequest};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use core_types::{Bar, PriceSeries};
use serde::Deserialize;
use std::time::Duration;

/// Binance caps a single klines response at this many bars.
const PAGE_LIMIT: usize = 1000;

/// A public-data client for the Binance spot klines endpoint.
#[derive(Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
}

// Intermediate struct for deserializing klines from Binance API
#[derive(Deserialize)]
struct RawKline(i64, String, String, String, String, String, i64, String, i64, String, String, String);

/// Represents an error response from the Binance API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    code: i64,
    msg: String,
}

impl BinanceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http {
                context: "client construction".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches a single page of at most `PAGE_LIMIT` bars starting at `start_ms`.
    async fn fetch_page(
        &self,
        request: &FetchRequest,
        start_ms: Option<i64>,
    ) -> Result<Vec<Bar>, FetchError> {
        let context = request.to_string();
        let http_error = |e: reqwest::Error| FetchError::Http {
            context: context.clone(),
            reason: e.to_string(),
        };

        let url = format!("{}/api/v3/klines", self.base_url);
        let mut query = vec![
            ("symbol", normalize_symbol(&request.symbol)),
            ("interval", request.timeframe.clone()),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(start) = start_ms {
            query.push(("startTime", start.to_string()));
        }
        if let Some(end) = request.end {
            query.push(("endTime", end.timestamp_millis().to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await.map_err(http_error)?;
        let status = response.status();
        let text = response.text().await.map_err(http_error)?;

        if status.is_server_error() || status.as_u16() == 429 || status.as_u16() == 418 {
            return Err(FetchError::Http {
                context,
                reason: format!("status {}: {}", status, text),
            });
        }
        if !status.is_success() {
            let api_error: ApiErrorResponse =
                serde_json::from_str(&text).map_err(|e| FetchError::InvalidData {
                    context: context.clone(),
                    reason: format!(
                        "Failed to deserialize error response: {}. Original text: {}",
                        e, text
                    ),
                })?;
            return Err(FetchError::Api {
                context,
                code: api_error.code,
                message: api_error.msg,
            });
        }

        let raw: Vec<RawKline> = serde_json::from_str(&text).map_err(|e| FetchError::InvalidData {
            context: context.clone(),
            reason: e.to_string(),
        })?;
        parse_klines(raw, &context)
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        let mut bars = Vec::new();
        let mut cursor = request.start.map(|s| s.timestamp_millis());

        loop {
            let page = self.fetch_page(request, cursor).await?;
            let page_len = page.len();
            let last_ms = page.last().map(|b| b.timestamp.timestamp_millis());
            bars.extend(page);

            tracing::debug!(request = %request, page_len, total = bars.len(), "Fetched klines page");

            // Without a start there is nothing to page forward from: Binance returns the latest bars.
            let (Some(previous), Some(last)) = (cursor, last_ms) else { break };
            if page_len < PAGE_LIMIT || last <= previous {
                break;
            }
            if request.end.is_some_and(|end| last >= end.timestamp_millis()) {
                break;
            }
            cursor = Some(last + 1);
        }

        finalize(request, bars)
    }
}

/// Accepts `BTC/USDT` as well as `BTCUSDT`.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

fn parse_klines(raw: Vec<RawKline>, context: &str) -> Result<Vec<Bar>, FetchError> {
    let invalid = |reason: String| FetchError::InvalidData {
        context: context.to_string(),
        reason,
    };
    let number = |field: &str, value: &str| {
        value
            .parse::<f64>()
            .map_err(|e| invalid(format!("Invalid {} '{}': {}", field, value, e)))
    };

    raw.into_iter()
        .map(|raw| {
            Ok(Bar {
                timestamp: Utc
                    .timestamp_millis_opt(raw.0)
                    .single()
                    .ok_or_else(|| invalid(format!("Invalid open_time: {}", raw.0)))?,
                open: number("open", &raw.1)?,
                high: number("high", &raw.2)?,
                low: number("low", &raw.3)?,
                close: number("close", &raw.4)?,
                volume: number("volume", &raw.5)?,
            })
        })
        .collect()
}

/// Sorts, deduplicates and clips the bars, then validates them into a series.
pub(crate) fn finalize(request: &FetchRequest, mut bars: Vec<Bar>) -> Result<PriceSeries, FetchError> {
    let range = request.range();
    bars.retain(|bar| range.contains(bar.timestamp));
    bars.sort_by_key(|bar| bar.timestamp);
    bars.dedup_by_key(|bar| bar.timestamp);

    if bars.is_empty() {
        return Err(FetchError::Empty {
            context: request.to_string(),
        });
    }

    PriceSeries::new(request.symbol.clone(), request.timeframe.clone(), bars).map_err(|e| {
        FetchError::InvalidData {
            context: request.to_string(),
            reason: e.to_string(),
        }
    })
}
