use crate::error::ConfigError;
use crate::optimizer_config::OptimizerSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub logging: LoggingSettings,
    pub strategies: Strategies,
    pub optimizer: OptimizerSettings,
}

impl Config {
    /// Rejects settings that deserialize cleanly but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.optimizer.workers == Some(0) {
            return Err(ConfigError::ValidationError(
                "optimizer.workers must be at least 1 when set".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level cannot be empty".to_string(),
            ));
        }
        if self.data.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "data.base_url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the market-data fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// REST endpoint serving public klines.
    pub base_url: String,
    /// Directory holding cached candle files.
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    /// Total attempts per request, including the first.
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            cache_dir: PathBuf::from(".cache"),
            use_cache: true,
            max_retries: 3,
            retry_delay_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, overridden by `RUST_LOG` when that is set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "chartist.log".to_string(),
        }
    }
}

/// Contains the default parameter sets for all available strategies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategies {
    pub bollinger_bands: BollingerParams,
    pub ma_cross: MACrossoverParams,
    pub rsi: RsiParams,
    pub macd: MacdParams,
    pub ichimoku: IchimokuParams,
}

/// Parameters for the Bollinger Bands mean-reversion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BollingerParams {
    pub period: usize,
    /// Band width in standard deviations.
    pub num_std: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self { period: 20, num_std: 2.0 }
    }
}

/// Parameters for the Moving Average Crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MACrossoverParams {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for MACrossoverParams {
    fn default() -> Self {
        Self { fast_period: 12, slow_period: 26 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RsiParams {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14, overbought: 70.0, oversold: 30.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self { fast_period: 12, slow_period: 26, signal_period: 9 }
    }
}

/// Parameters for the Ichimoku Kinko Hyo strategy.
///
/// Common ranges: Tenkan 5-30, Kijun 20-60, Senkou Span B 40-120. The displacement is
/// typically set equal to the Kijun period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IchimokuParams {
    pub tenkan_period: usize,
    pub kijun_period: usize,
    pub senkou_span_b_period: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            senkou_span_b_period: 52,
            displacement: 26,
        }
    }
}
