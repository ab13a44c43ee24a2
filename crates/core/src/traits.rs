//! Seams toward the external collaborators.
//!
//! The single-run backtest/optimization engine and the raw price-data source
//! are not implemented in this workspace; components talk to them through
//! these traits. Calls are CPU-bound and synchronous; the batch runner wraps
//! them in blocking tasks when it parallelizes.

use crate::error::BacktestError;
use crate::params::{ParameterSet, StrategyTemplate};
use crate::series::PriceSeries;
use crate::stats::{BacktestConfig, Objective, RunStatistics};

/// The external single-run backtest/optimization engine.
pub trait BacktestEngine: Send + Sync {
    /// Runs every candidate parameter set and returns the statistics of the
    /// best one under `objective`. Candidates are already constraint-filtered.
    fn optimize(
        &self,
        series: &PriceSeries,
        strategy: &StrategyTemplate,
        candidates: &[ParameterSet],
        objective: &Objective,
        config: &BacktestConfig,
    ) -> Result<RunStatistics, BacktestError>;

    /// Runs a single backtest with a fixed, immutable parameter set.
    fn run_fixed(
        &self,
        series: &PriceSeries,
        strategy: &StrategyTemplate,
        params: &ParameterSet,
        config: &BacktestConfig,
    ) -> Result<RunStatistics, BacktestError>;

    /// Runs a single unconstrained backtest with the strategy's defaults.
    fn run_default(
        &self,
        series: &PriceSeries,
        strategy: &StrategyTemplate,
    ) -> Result<RunStatistics, BacktestError>;
}

/// Produces a price series for an instrument identifier.
pub trait DataSource: Send + Sync {
    /// # Errors
    /// [`BacktestError::DataSource`] with `NotFound` when the instrument is
    /// unknown, `Empty` when it exists but holds no bars.
    fn load(&self, symbol: &str) -> Result<PriceSeries, BacktestError>;
}
