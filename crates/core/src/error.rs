//! Error taxonomy for walk-forward testing.
//!
//! Window- and instrument-scoped failures (`WindowData`, `NoValidParameters`,
//! `DataSource`) are recoverable: the loop iterating windows or instruments
//! catches them, logs the offending identifier, and continues. Only
//! configuration and data-integrity errors are meant to propagate as fatal.

use chrono::NaiveDate;
use thiserror::Error;

/// Why a data source could not produce a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DataSourceErrorKind {
    /// No data exists for the requested instrument.
    #[error("not found")]
    NotFound,
    /// The instrument exists but holds zero bars.
    #[error("empty data")]
    Empty,
}

/// Errors produced by the walk-forward core.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// A planned window sliced to zero bars. Skippable, never fatal to a run.
    #[error("window [{start}, {end}) sliced to zero bars")]
    WindowData { start: NaiveDate, end: NaiveDate },

    /// The constrained parameter grid expanded to nothing. Skippable.
    #[error("parameter grid has no valid combinations after constraint filtering")]
    NoValidParameters,

    /// The data-source collaborator failed for one instrument. Skippable.
    #[error("data source error for '{symbol}': {kind}")]
    DataSource {
        symbol: String,
        kind: DataSourceErrorKind,
    },

    /// Malformed configuration (e.g. a non-positive period). Fatal.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A price series violated its ordering invariants. Fatal.
    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    /// Failure inside the external backtest engine adapter. Scoped to the
    /// window or instrument that triggered it.
    #[error("backtest engine failure: {0}")]
    Engine(String),
}

impl BacktestError {
    /// Returns true if this failure is scoped to one window or instrument
    /// and should be skipped by the iterating loop rather than aborting it.
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_) | Self::InvalidSeries(_))
    }
}
