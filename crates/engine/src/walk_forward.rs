//! The walk-forward orchestration loop.
//!
//! Repeats the optimize/validate cycle over the planner's backward walk,
//! accumulating a results table and a cumulative trade ledger. The single
//! most important correctness rule lives here: out-of-sample trades that
//! were still open when their window ended are dropped, because the forced
//! close at the boundary is an artifact of the window, not of the strategy's
//! exit logic.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use walkforward_core::{
    BacktestConfig, BacktestEngine, BacktestError, Objective, ParameterSet, PriceSeries,
    StrategyTemplate, TradeLedger,
};

use crate::evaluator::OutOfSampleEvaluator;
use crate::grid::ParameterGrid;
use crate::window::{WindowPlanner, WindowPlannerConfig};

/// Configuration for one walk-forward run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardConfig {
    pub window: WindowPlannerConfig,
    pub objective: Objective,
    pub backtest: BacktestConfig,
}

impl WalkForwardConfig {
    #[must_use]
    pub fn new(in_period_years: f64, out_period_years: f64, objective: Objective) -> Self {
        Self {
            window: WindowPlannerConfig::new(in_period_years, out_period_years),
            objective,
            backtest: BacktestConfig::default(),
        }
    }

    /// Overrides the settings forwarded to the backtest engine.
    #[must_use]
    pub fn with_backtest(mut self, backtest: BacktestConfig) -> Self {
        self.backtest = backtest;
        self
    }
}

/// One summary row of the results table: the out-of-sample statistics of a
/// window plus every optimized parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardRow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub exposure_pct: f64,
    pub trade_count: usize,
    pub win_rate_pct: f64,
    pub best_trade_pct: f64,
    pub worst_trade_pct: f64,
    pub avg_trade_pct: f64,
    pub max_trade_duration_days: i64,
    pub avg_trade_duration_days: f64,
    pub params: ParameterSet,
}

/// A window whose evaluation failed and was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedWindow {
    pub window: String,
    pub reason: String,
}

/// Everything a walk-forward run accumulated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkForwardReport {
    /// One row per evaluated window, newest window first.
    pub rows: Vec<WalkForwardRow>,
    /// Surviving out-of-sample trades, appended newest window first.
    pub ledger: TradeLedger,
    /// Windows skipped due to recoverable failures.
    pub skipped: Vec<SkippedWindow>,
}

/// Drives planner and evaluator across the whole series.
pub struct WalkForwardDriver {
    engine: Arc<dyn BacktestEngine>,
    config: WalkForwardConfig,
}

impl WalkForwardDriver {
    #[must_use]
    pub fn new(engine: Arc<dyn BacktestEngine>, config: WalkForwardConfig) -> Self {
        Self { engine, config }
    }

    /// Runs the walk-forward loop to exhaustion.
    ///
    /// Window-scoped failures are skipped and reported in the result; the
    /// loop only fails on malformed configuration. Zero produced windows is
    /// a valid outcome and yields an empty report.
    ///
    /// # Errors
    /// [`BacktestError::InvalidConfig`] / [`BacktestError::InvalidSeries`]
    /// only.
    pub fn run(
        &self,
        series: &PriceSeries,
        strategy: &StrategyTemplate,
        grid: &ParameterGrid,
    ) -> Result<WalkForwardReport, BacktestError> {
        let planner = WindowPlanner::new(&self.config.window)?;
        let evaluator = OutOfSampleEvaluator::new(
            Arc::clone(&self.engine),
            self.config.objective.clone(),
            self.config.backtest.clone(),
        );

        let mut report = WalkForwardReport::default();

        for window in planner.windows(series) {
            let (_, stats_out) = match evaluator.evaluate(series, &window, strategy, grid) {
                Ok(pair) => pair,
                Err(err) if err.is_skippable() => {
                    warn!(window = %window.label(), %err, "skipping window");
                    report.skipped.push(SkippedWindow {
                        window: window.label(),
                        reason: err.to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };

            // Index of the last out-of-sample bar. A trade exiting exactly
            // there was closed by the window boundary, not by the strategy,
            // and would bias the results if kept.
            let out_sample_bar_count = series.bar_count(window.mid, window.end).saturating_sub(1);
            let signature = strategy.signature(&stats_out.params);

            report.ledger.extend(
                stats_out
                    .trades
                    .iter()
                    .filter(|t| t.exit_bar != out_sample_bar_count)
                    .cloned()
                    .map(|t| t.with_strategy(signature.clone())),
            );

            report.rows.push(WalkForwardRow {
                start: stats_out.start,
                end: stats_out.end,
                exposure_pct: stats_out.exposure_pct,
                trade_count: stats_out.trade_count,
                win_rate_pct: stats_out.win_rate_pct,
                best_trade_pct: stats_out.best_trade_pct,
                worst_trade_pct: stats_out.worst_trade_pct,
                avg_trade_pct: stats_out.avg_trade_pct,
                max_trade_duration_days: stats_out.max_trade_duration_days,
                avg_trade_duration_days: stats_out.avg_trade_duration_days,
                params: stats_out.params,
            });
        }

        info!(
            windows = report.rows.len(),
            skipped = report.skipped.len(),
            trades = report.ledger.len(),
            "walk-forward run complete"
        );
        Ok(report)
    }
}
