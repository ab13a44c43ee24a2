pub mod error;
pub mod params;
pub mod series;
pub mod stats;
pub mod trade;
pub mod traits;

pub use error::{BacktestError, DataSourceErrorKind};
pub use params::{ParameterSet, StrategyTemplate};
pub use series::{Bar, PriceSeries};
pub use stats::{BacktestConfig, Objective, RunStatistics};
pub use trade::{Trade, TradeLedger};
pub use traits::{BacktestEngine, DataSource};
