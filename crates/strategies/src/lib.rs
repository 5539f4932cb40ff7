//! # Chartist Strategy Library
//!
//! This crate contains the signal logic for the Chartist backtester. It defines a
//! universal `Strategy` trait and provides the five concrete implementations.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** This is a pure logic crate. It has no knowledge of exchanges,
//!   files, or the optimizer. It depends only on `core-types` and `configuration`.
//! - **Pure Evaluation:** `generate_signals` takes `&self` and builds fresh indicator
//!   state on every call, so the same (series, parameters) pair always produces the
//!   same `SignalSeries`, and one strategy instance can be shared across threads.
//! - **Closed Set:** The variants are enumerated by `StrategyId`; `build_strategy`
//!   is the only place that maps parameters to an implementation.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all strategies implement.
//! - `StrategyParams`: A typed parameter set for one variant.
//! - `create_strategy` / `build_strategy`: The factory functions.
//! - The concrete strategy structs themselves (e.g., `MACrossover`).

// Declare all the modules that constitute this crate.
mod base;
pub mod bollinger;
pub mod error;
pub mod factory;
pub mod ichimoku;
pub mod indicators;
pub mod ma_crossover;
pub mod macd;
pub mod params;
pub mod rsi;

// Re-export the key components to create a clean, public-facing API.
pub use bollinger::BollingerBandsStrategy;
pub use error::StrategyError;
pub use factory::{build_strategy, create_strategy, create_strategy_by_name};
pub use ichimoku::Ichimoku;
pub use ma_crossover::MACrossover;
pub use macd::MacdStrategy;
pub use params::StrategyParams;
pub use rsi::RsiStrategy;

// Re-export StrategyId from core_types
pub use core_types::StrategyId;

use core_types::{PriceSeries, SignalSeries};

/// The core trait that all trading strategies must implement.
///
/// The `Send + Sync` bounds are required to allow strategies to be used across
/// multiple threads in the parallel optimizer.
pub trait Strategy: Send + Sync {
    fn id(&self) -> StrategyId;

    /// The parameters this instance was built with.
    fn params(&self) -> StrategyParams;

    /// Index of the first bar whose signal is computed from fully warmed-up indicators.
    fn warmup(&self) -> usize;

    /// Derives a per-bar signal and the profit it realises on the following bar.
    ///
    /// # Returns
    ///
    /// * `Ok(SignalSeries)` - one point per bar of `series`, in the same order.
    /// * `Err(StrategyError)` - if an indicator cannot be computed for this input.
    fn generate_signals(&self, series: &PriceSeries) -> Result<SignalSeries, StrategyError>;
}
