//! # Chartist Analytics Engine
//!
//! This crate reduces a strategy's per-bar signal and profit series into summary metrics.
//! It has no notion of orders or capital: every bar is scored by the return it realises.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It takes
//!   a `SignalSeries` as input and produces `PerformanceMetrics` as output.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `PerformanceMetrics`: The standardized struct that holds the performance metrics.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::PerformanceMetrics;
