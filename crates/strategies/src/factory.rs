use crate::bollinger::BollingerBandsStrategy;
use crate::error::StrategyError;
use crate::ichimoku::Ichimoku;
use crate::ma_crossover::MACrossover;
use crate::macd::MacdStrategy;
use crate::params::StrategyParams;
use crate::rsi::RsiStrategy;
use crate::Strategy;
use configuration::Strategies;
use core_types::StrategyId;

/// Creates a strategy instance from the configured defaults for `id`.
pub fn create_strategy(
    id: StrategyId,
    strategies: &Strategies,
) -> Result<Box<dyn Strategy>, StrategyError> {
    build_strategy(StrategyParams::from_config(id, strategies))
}

/// Creates a strategy from its name (e.g. `"ichimoku"` or `"bb"`) and the configured defaults.
pub fn create_strategy_by_name(
    name: &str,
    strategies: &Strategies,
) -> Result<Box<dyn Strategy>, StrategyError> {
    let id = name
        .parse::<StrategyId>()
        .map_err(|_| StrategyError::StrategyNotFound(name.to_string()))?;
    create_strategy(id, strategies)
}

/// Creates a strategy instance from an explicit parameter set.
pub fn build_strategy(params: StrategyParams) -> Result<Box<dyn Strategy>, StrategyError> {
    match params {
        StrategyParams::BollingerBands(p) => Ok(Box::new(BollingerBandsStrategy::new(p)?)),
        StrategyParams::MaCrossover(p) => Ok(Box::new(MACrossover::new(p)?)),
        StrategyParams::Rsi(p) => Ok(Box::new(RsiStrategy::new(p)?)),
        StrategyParams::Macd(p) => Ok(Box::new(MacdStrategy::new(p)?)),
        StrategyParams::Ichimoku(p) => Ok(Box::new(Ichimoku::new(p)?)),
    }
}
