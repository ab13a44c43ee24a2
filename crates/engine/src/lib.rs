//! Walk-forward testing, batched multi-instrument backtests, and Monte Carlo
//! trade resampling on top of an external single-run backtest engine.

pub mod batch;
pub mod data_source;
pub mod evaluator;
pub mod grid;
pub mod monte_carlo;
pub mod walk_forward;
pub mod window;

pub use batch::{BatchConfig, BatchReport, BatchRunner};
pub use data_source::CsvDataSource;
pub use evaluator::OutOfSampleEvaluator;
pub use grid::{Constraint, ParameterGrid};
pub use monte_carlo::{
    MonteCarloConfig, MonteCarloEngine, MonteCarloResults, MonteCarloSummary, PathOutcome,
    DEFAULT_NUM_PATHS,
};
pub use walk_forward::{
    SkippedWindow, WalkForwardConfig, WalkForwardDriver, WalkForwardReport, WalkForwardRow,
};
pub use window::{WindowPlanner, WindowPlannerConfig, WindowSpec};
