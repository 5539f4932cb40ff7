use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The discrete trading decision attached to a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Short,
    #[default]
    Flat,
    Long,
}

impl Signal {
    /// Returns the signal as its `{-1, 0, 1}` encoding.
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    /// The exposure multiplier applied to a bar's return.
    pub fn direction(self) -> f64 {
        f64::from(self.as_i8())
    }

    pub fn is_flat(self) -> bool {
        self == Signal::Flat
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.as_i8()
    }
}

impl TryFrom<i8> for Signal {
    type Error = CoreError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Short),
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            other => Err(CoreError::InvalidInput(
                "signal".to_string(),
                format!("{} is not one of -1, 0, 1", other),
            )),
        }
    }
}

/// Identifies one of the closed set of strategy variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyId {
    #[serde(rename = "bollinger-bands", alias = "bb")]
    BollingerBands,
    #[serde(rename = "ma-cross")]
    MaCrossover,
    #[serde(rename = "rsi")]
    Rsi,
    #[serde(rename = "macd")]
    Macd,
    #[serde(rename = "ichimoku")]
    Ichimoku,
}

impl StrategyId {
    pub const ALL: [StrategyId; 5] = [
        StrategyId::BollingerBands,
        StrategyId::MaCrossover,
        StrategyId::Rsi,
        StrategyId::Macd,
        StrategyId::Ichimoku,
    ];

    /// The kebab-case tag used on the command line and in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::BollingerBands => "bollinger-bands",
            StrategyId::MaCrossover => "ma-cross",
            StrategyId::Rsi => "rsi",
            StrategyId::Macd => "macd",
            StrategyId::Ichimoku => "ichimoku",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bollinger-bands" | "bb" => Ok(StrategyId::BollingerBands),
            "ma-cross" => Ok(StrategyId::MaCrossover),
            "rsi" => Ok(StrategyId::Rsi),
            "macd" => Ok(StrategyId::Macd),
            "ichimoku" => Ok(StrategyId::Ichimoku),
            _ => Err(CoreError::UnknownStrategy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_round_trips_through_its_integer_encoding() {
        for signal in [Signal::Short, Signal::Flat, Signal::Long] {
            assert_eq!(Signal::try_from(signal.as_i8()), Ok(signal));
        }
        assert!(Signal::try_from(2).is_err());
    }

    #[test]
    fn signal_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Signal::Short).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<Signal>("1").unwrap(), Signal::Long);
    }

    #[test]
    fn strategy_id_parses_tags_and_aliases() {
        assert_eq!("bb".parse::<StrategyId>().unwrap(), StrategyId::BollingerBands);
        assert_eq!("Ichimoku".parse::<StrategyId>().unwrap(), StrategyId::Ichimoku);
        for id in StrategyId::ALL {
            assert_eq!(id.as_str().parse::<StrategyId>().unwrap(), id);
        }
        assert!("supertrend".parse::<StrategyId>().is_err());
    }
}
