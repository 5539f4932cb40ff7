use crate::error::StrategyError;
use configuration::{
    BollingerParams, IchimokuParams, MACrossoverParams, MacdParams, RsiParams, Strategies,
};
use core_types::StrategyId;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A complete, typed parameter set for one strategy variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StrategyParams {
    BollingerBands(BollingerParams),
    MaCrossover(MACrossoverParams),
    Rsi(RsiParams),
    Macd(MacdParams),
    Ichimoku(IchimokuParams),
}

impl StrategyParams {
    /// The configured defaults for the given strategy.
    pub fn from_config(id: StrategyId, strategies: &Strategies) -> Self {
        match id {
            StrategyId::BollingerBands => StrategyParams::BollingerBands(strategies.bollinger_bands),
            StrategyId::MaCrossover => StrategyParams::MaCrossover(strategies.ma_cross),
            StrategyId::Rsi => StrategyParams::Rsi(strategies.rsi),
            StrategyId::Macd => StrategyParams::Macd(strategies.macd),
            StrategyId::Ichimoku => StrategyParams::Ichimoku(strategies.ichimoku),
        }
    }

    pub fn id(&self) -> StrategyId {
        match self {
            StrategyParams::BollingerBands(_) => StrategyId::BollingerBands,
            StrategyParams::MaCrossover(_) => StrategyId::MaCrossover,
            StrategyParams::Rsi(_) => StrategyId::Rsi,
            StrategyParams::Macd(_) => StrategyId::Macd,
            StrategyParams::Ichimoku(_) => StrategyId::Ichimoku,
        }
    }

    /// The parameter set as a flat JSON object keyed by field name.
    pub fn to_json(&self) -> Value {
        // Serializing plain structs of numbers cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Returns a copy with the named fields replaced.
    ///
    /// Fields absent from `overrides` keep their current values. An unknown name, or a
    /// value of the wrong type (e.g. `2.5` for a period), is rejected.
    pub fn with_overrides(&self, overrides: &Map<String, Value>) -> Result<Self, StrategyError> {
        let mut merged = match self.to_json() {
            Value::Object(map) => map,
            other => {
                return Err(StrategyError::InvalidParameters(format!(
                    "parameter set did not serialize to an object: {}",
                    other
                )));
            }
        };
        for (name, value) in overrides {
            merged.insert(name.clone(), value.clone());
        }
        let merged = Value::Object(merged);

        let invalid = |e: serde_json::Error| {
            StrategyError::InvalidParameters(format!("{} parameters: {}", self.id(), e))
        };
        Ok(match self {
            StrategyParams::BollingerBands(_) => {
                StrategyParams::BollingerBands(serde_json::from_value(merged).map_err(invalid)?)
            }
            StrategyParams::MaCrossover(_) => {
                StrategyParams::MaCrossover(serde_json::from_value(merged).map_err(invalid)?)
            }
            StrategyParams::Rsi(_) => StrategyParams::Rsi(serde_json::from_value(merged).map_err(invalid)?),
            StrategyParams::Macd(_) => StrategyParams::Macd(serde_json::from_value(merged).map_err(invalid)?),
            StrategyParams::Ichimoku(_) => {
                StrategyParams::Ichimoku(serde_json::from_value(merged).map_err(invalid)?)
            }
        })
    }
}

impl fmt::Display for StrategyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyParams::BollingerBands(p) => write!(f, "period={} num_std={}", p.period, p.num_std),
            StrategyParams::MaCrossover(p) => {
                write!(f, "fast_period={} slow_period={}", p.fast_period, p.slow_period)
            }
            StrategyParams::Rsi(p) => write!(
                f,
                "period={} overbought={} oversold={}",
                p.period, p.overbought, p.oversold
            ),
            StrategyParams::Macd(p) => write!(
                f,
                "fast_period={} slow_period={} signal_period={}",
                p.fast_period, p.slow_period, p.signal_period
            ),
            StrategyParams::Ichimoku(p) => write!(
                f,
                "tenkan_period={} kijun_period={} senkou_span_b_period={} displacement={}",
                p.tenkan_period, p.kijun_period, p.senkou_span_b_period, p.displacement
            ),
        }
    }
}
