//! One optimize-then-validate cycle over a window pair.

use std::sync::Arc;

use walkforward_core::{
    BacktestConfig, BacktestEngine, BacktestError, Objective, ParameterSet, PriceSeries,
    RunStatistics, StrategyTemplate,
};

use crate::grid::ParameterGrid;
use crate::window::WindowSpec;

/// Optimizes on the in-sample range and validates the winning parameters on
/// the out-of-sample range, through the external engine adapter.
pub struct OutOfSampleEvaluator {
    engine: Arc<dyn BacktestEngine>,
    objective: Objective,
    backtest_config: BacktestConfig,
}

impl OutOfSampleEvaluator {
    #[must_use]
    pub fn new(
        engine: Arc<dyn BacktestEngine>,
        objective: Objective,
        backtest_config: BacktestConfig,
    ) -> Self {
        Self {
            engine,
            objective,
            backtest_config,
        }
    }

    /// Runs one optimize/validate cycle for `window`.
    ///
    /// Returns the in-sample (optimization) statistics and the out-of-sample
    /// (fixed-parameter validation) statistics. The series is never mutated.
    ///
    /// # Errors
    /// - [`BacktestError::WindowData`] when either slice holds zero bars.
    /// - [`BacktestError::NoValidParameters`] when the constrained grid is
    ///   empty.
    /// - Whatever the engine adapter fails with.
    pub fn evaluate(
        &self,
        series: &PriceSeries,
        window: &WindowSpec,
        strategy: &StrategyTemplate,
        grid: &ParameterGrid,
    ) -> Result<(RunStatistics, RunStatistics), BacktestError> {
        let in_series = series.slice(window.start, window.mid);
        if in_series.is_empty() {
            return Err(BacktestError::WindowData {
                start: window.start,
                end: window.mid,
            });
        }

        let out_series = series.slice(window.mid, window.end);
        if out_series.is_empty() {
            return Err(BacktestError::WindowData {
                start: window.mid,
                end: window.end,
            });
        }

        let candidates: Vec<ParameterSet> = grid.expand();
        if candidates.is_empty() {
            return Err(BacktestError::NoValidParameters);
        }

        let stats_in = self.engine.optimize(
            &in_series,
            strategy,
            &candidates,
            &self.objective,
            &self.backtest_config,
        )?;

        let stats_out = self.engine.run_fixed(
            &out_series,
            strategy,
            &stats_in.params,
            &self.backtest_config,
        )?;

        Ok((stats_in, stats_out))
    }
}
