//! # Chartist Grid-Search Optimizer
//!
//! Exhaustively evaluates a Cartesian grid of strategy parameters against one or more
//! price series and reports the combination with the highest total profit.
//!
//! Every combination is a pure function of (series, parameters), so the grid is fanned
//! out over a dedicated `rayon` pool with no shared mutable state. Results come back in
//! enumeration order and are reduced on the calling thread, which keeps the outcome
//! deterministic regardless of how the pool schedules work.

use crate::error::OptimizerError;
use analytics::PerformanceMetrics;
use backtester::Backtester;
use configuration::{Config, ParameterDef};
use core_types::{DateRange, PriceSeries, StrategyId};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use strategies::StrategyParams;
use uuid::Uuid;

pub mod constraints;
pub mod error;
pub mod generator;

pub use generator::{build_candidates, default_ichimoku_space, generate_parameter_sets};

/// One evaluated combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub params: StrategyParams,
    pub total_profit: f64,
    pub metrics: PerformanceMetrics,
}

/// The result of searching the grid against one timeframe's series.
#[derive(Debug, Clone, Serialize)]
pub struct TimeframeOutcome {
    pub timeframe: String,
    /// `None` when no combination could be evaluated.
    pub best: Option<SearchResult>,
    pub evaluated: usize,
    /// Rejected by the validity predicate.
    pub skipped: usize,
    /// Evaluation errored or produced a non-finite profit.
    pub failed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationOutcome {
    pub job_id: Uuid,
    pub strategy_id: StrategyId,
    pub timeframes: Vec<TimeframeOutcome>,
    /// The best result across all timeframes, with the timeframe it came from.
    pub best: Option<(String, SearchResult)>,
}

impl OptimizationOutcome {
    pub fn to_json(&self) -> Result<String, OptimizerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// How a single combination ended up.
#[derive(Debug)]
enum Evaluation {
    Evaluated(SearchResult),
    Skipped,
    Failed,
}

impl Evaluation {
    /// Skipped and failed combinations score negative infinity so they never win.
    fn score(&self) -> f64 {
        match self {
            Evaluation::Evaluated(result) => result.total_profit,
            Evaluation::Skipped | Evaluation::Failed => f64::NEG_INFINITY,
        }
    }
}

pub struct GridSearchOptimizer {
    job_id: Uuid,
    base: StrategyParams,
    parameter_space: Vec<ParameterDef>,
    workers: usize,
    show_progress: bool,
}

impl GridSearchOptimizer {
    /// A search over `parameter_space`, with unnamed parameters held at `base`.
    pub fn new(base: StrategyParams, parameter_space: Vec<ParameterDef>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            base,
            parameter_space,
            workers: num_cpus::get().max(1),
            show_progress: false,
        }
    }

    /// A search configured from the `[optimizer]` and `[strategies]` sections.
    ///
    /// Ichimoku falls back to its historical grid when no space is configured; other
    /// strategies evaluate only their defaults.
    pub fn from_config(strategy_id: StrategyId, config: &Config) -> Self {
        let base = StrategyParams::from_config(strategy_id, &config.strategies);
        let mut space = config.optimizer.parameter_space.clone();
        if space.is_empty() && strategy_id == StrategyId::Ichimoku {
            space = default_ichimoku_space();
        }

        let mut optimizer = Self::new(base, space).with_progress(config.optimizer.show_progress);
        if let Some(workers) = config.optimizer.workers {
            optimizer = optimizer.with_workers(workers);
        }
        optimizer
    }

    /// Bounds the worker pool. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn strategy_id(&self) -> StrategyId {
        self.base.id()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Every candidate in enumeration order, before validity filtering.
    pub fn candidates(&self) -> Result<Vec<StrategyParams>, OptimizerError> {
        build_candidates(&self.base, &self.parameter_space)
    }

    /// Fetches every timeframe first, then searches each one.
    ///
    /// A fetch failure aborts the job before any evaluation starts.
    pub fn run_fetching<F, E>(
        &self,
        symbol: &str,
        timeframes: &[String],
        range: DateRange,
        mut fetch: F,
    ) -> Result<OptimizationOutcome, OptimizerError>
    where
        F: FnMut(&str) -> Result<PriceSeries, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut data = Vec::with_capacity(timeframes.len());
        for timeframe in timeframes {
            let series = fetch(timeframe).map_err(|e| OptimizerError::DataFetch {
                symbol: symbol.to_string(),
                timeframe: timeframe.clone(),
                range,
                source: Box::new(e),
            })?;
            data.push(Arc::new(series));
        }
        self.run(&data)
    }

    /// Searches the grid once per series and tracks the best result across them.
    ///
    /// An empty series is fatal. Earlier series win ties for the global best.
    pub fn run(&self, data: &[Arc<PriceSeries>]) -> Result<OptimizationOutcome, OptimizerError> {
        if let Some(empty) = data.iter().find(|series| series.is_empty()) {
            return Err(OptimizerError::DataUnavailable {
                symbol: empty.symbol().to_string(),
                timeframe: empty.timeframe().to_string(),
            });
        }

        let candidates = self.candidates()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("optimizer-{}", i))
            .build()?;

        tracing::info!(
            job_id = %self.job_id,
            strategy = %self.strategy_id(),
            combinations = candidates.len(),
            timeframes = data.len(),
            workers = self.workers,
            "Starting optimization job"
        );

        let mut timeframes = Vec::with_capacity(data.len());
        let mut best: Option<(String, SearchResult)> = None;
        for series in data {
            let outcome = self.search(&pool, &candidates, series)?;
            if let Some(candidate) = &outcome.best {
                let improves = best
                    .as_ref()
                    .is_none_or(|(_, current)| candidate.total_profit > current.total_profit);
                if improves {
                    best = Some((outcome.timeframe.clone(), candidate.clone()));
                }
            }
            timeframes.push(outcome);
        }

        match &best {
            Some((timeframe, result)) => tracing::info!(
                job_id = %self.job_id,
                timeframe = %timeframe,
                params = %result.params,
                total_profit = result.total_profit,
                "Optimization job complete"
            ),
            None => tracing::warn!(job_id = %self.job_id, "No combination could be evaluated"),
        }

        Ok(OptimizationOutcome {
            job_id: self.job_id,
            strategy_id: self.strategy_id(),
            timeframes,
            best,
        })
    }

    /// One full grid search against a single series.
    fn search(
        &self,
        pool: &rayon::ThreadPool,
        candidates: &[StrategyParams],
        series: &Arc<PriceSeries>,
    ) -> Result<TimeframeOutcome, OptimizerError> {
        let progress_bar = self.progress_bar(candidates.len() as u64, series.timeframe())?;

        let evaluations: Vec<Evaluation> = pool.install(|| {
            candidates
                .par_iter()
                .map(|params| {
                    let evaluation = evaluate(params, series);
                    progress_bar.inc(1);
                    evaluation
                })
                .collect()
        });
        progress_bar.finish_and_clear();

        let mut outcome = TimeframeOutcome {
            timeframe: series.timeframe().to_string(),
            best: None,
            evaluated: 0,
            skipped: 0,
            failed: 0,
            total: candidates.len(),
        };

        // Strictly greater, so the first-enumerated combination keeps a tie.
        let mut best_score = f64::NEG_INFINITY;
        for evaluation in evaluations {
            let score = evaluation.score();
            match evaluation {
                Evaluation::Evaluated(result) => {
                    outcome.evaluated += 1;
                    if score > best_score {
                        best_score = score;
                        outcome.best = Some(result);
                    }
                }
                Evaluation::Skipped => outcome.skipped += 1,
                Evaluation::Failed => outcome.failed += 1,
            }
        }

        tracing::info!(
            job_id = %self.job_id,
            timeframe = %outcome.timeframe,
            evaluated = outcome.evaluated,
            skipped = outcome.skipped,
            failed = outcome.failed,
            best_profit = best_score,
            "Timeframe search complete"
        );
        Ok(outcome)
    }

    fn progress_bar(&self, len: u64, timeframe: &str) -> Result<ProgressBar, OptimizerError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );
        progress_bar.set_message(timeframe.to_string());
        Ok(progress_bar)
    }
}

/// Evaluates one combination. Never fails the job: errors are contained as `Failed`.
fn evaluate(params: &StrategyParams, series: &Arc<PriceSeries>) -> Evaluation {
    if !constraints::is_valid(params) {
        tracing::debug!(params = %params, "Skipping invalid combination");
        return Evaluation::Skipped;
    }

    let metrics = Backtester::from_params(*params)
        .map(|backtester| backtester.with_data(Arc::clone(series)))
        .and_then(|backtester| backtester.get_performance_metrics());

    match metrics {
        Ok(metrics) if metrics.total_profit.is_finite() => {
            tracing::debug!(params = %params, total_profit = metrics.total_profit, "Combination evaluated");
            Evaluation::Evaluated(SearchResult {
                params: *params,
                total_profit: metrics.total_profit,
                metrics,
            })
        }
        Ok(metrics) => {
            tracing::warn!(params = %params, total_profit = metrics.total_profit, "Non-finite profit");
            Evaluation::Failed
        }
        Err(e) => {
            tracing::warn!(params = %params, error = %e, "Combination failed");
            Evaluation::Failed
        }
    }
}
