use crate::enums::Signal;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One OHLCV candle at a fixed timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// An ordered, immutable series of bars for one (symbol, timeframe) pair.
///
/// Construction enforces strictly increasing timestamps, which also rules out
/// duplicates. Once built, the series is only ever borrowed read-only, so it can
/// be shared across worker threads behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    timeframe: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        bars: Vec<Bar>,
    ) -> Result<Self, CoreError> {
        for (i, bar) in bars.iter().enumerate() {
            let fields = [bar.open, bar.high, bar.low, bar.close, bar.volume];
            if fields.iter().any(|v| !v.is_finite()) {
                return Err(CoreError::InvalidInput(
                    "bar".to_string(),
                    format!("non-finite OHLCV value at {}", bar.timestamp),
                ));
            }
            if i > 0 && bars[i - 1].timestamp >= bar.timestamp {
                return Err(CoreError::InvalidInput(
                    "bar".to_string(),
                    format!(
                        "timestamps must be strictly increasing ({} followed by {})",
                        bars[i - 1].timestamp, bar.timestamp
                    ),
                ));
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.timestamp)
    }
}

/// A single element of a [`SignalSeries`], aligned with one bar of the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub signal: Signal,
    /// Return realised on this bar by the previous bar's signal.
    /// `None` on the first bar and throughout the indicator warm-up.
    pub profit: Option<f64>,
}

/// Per-bar signals and realised profits, one point per input bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    points: Vec<SignalPoint>,
    warmup: usize,
}

impl SignalSeries {
    pub fn new(points: Vec<SignalPoint>, warmup: usize) -> Self {
        Self { points, warmup }
    }

    pub fn points(&self) -> &[SignalPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SignalPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the first bar whose signal is backed by valid indicator values.
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.points.iter().map(|p| p.signal).collect()
    }

    /// The defined profits, in bar order.
    pub fn profits(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.profit).collect()
    }
}

impl<'a> IntoIterator for &'a SignalSeries {
    type Item = &'a SignalPoint;
    type IntoIter = std::slice::Iter<'a, SignalPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// An optional, inclusive time window used to select bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self, CoreError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(CoreError::InvalidInput(
                    "date range".to_string(),
                    format!("start {} is after end {}", s, e),
                ));
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| timestamp >= s) && self.end.is_none_or(|e| timestamp <= e)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |t: Option<DateTime<Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "*".to_string());
        write!(f, "{}..{}", side(self.start), side(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar_at(hour: i64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn accepts_strictly_increasing_bars() {
        let series = PriceSeries::new("BTC/USDT", "1h", vec![bar_at(0, 1.0), bar_at(1, 2.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.0, 2.0]);
        assert_eq!(series.symbol(), "BTC/USDT");
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = PriceSeries::new("BTC/USDT", "1h", vec![bar_at(0, 1.0), bar_at(0, 2.0)]);
        assert!(matches!(err, Err(CoreError::InvalidInput(_, _))));
    }

    #[test]
    fn rejects_non_finite_prices() {
        let err = PriceSeries::new("BTC/USDT", "1h", vec![bar_at(0, f64::NAN)]);
        assert!(err.is_err());
    }

    #[test]
    fn profits_skip_undefined_points() {
        let points = vec![
            SignalPoint { timestamp: bar_at(0, 1.0).timestamp, price: 1.0, signal: Signal::Flat, profit: None },
            SignalPoint { timestamp: bar_at(1, 2.0).timestamp, price: 2.0, signal: Signal::Long, profit: Some(0.0) },
        ];
        let series = SignalSeries::new(points, 0);
        assert_eq!(series.profits(), vec![0.0]);
        assert_eq!(series.signals(), vec![Signal::Flat, Signal::Long]);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let range = DateRange::new(Some(start), Some(end)).unwrap();
        assert!(range.contains(start) && range.contains(end));
        assert!(!range.contains(end + chrono::Duration::seconds(1)));
        assert!(DateRange::default().contains(start));
        assert!(DateRange::new(Some(end), Some(start)).is_err());
    }
}
