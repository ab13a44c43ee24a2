//! Closed trades and the append-only trade ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One closed position produced by a backtest run.
///
/// Created by the engine adapter when a position closes; read-only afterward
/// except for attaching provenance (originating instrument and strategy
/// signature) via the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    /// Index of the entry bar within the run's series.
    pub entry_bar: usize,
    /// Index of the exit bar within the run's series.
    pub exit_bar: usize,
    /// Return of the trade as a ratio (0.05 = +5%).
    pub return_pct: f64,
    /// Holding duration in calendar days.
    pub duration_days: i64,
    /// Instrument label attached by multi-instrument runs.
    pub symbol: Option<String>,
    /// Strategy signature attached by the walk-forward driver.
    pub strategy: Option<String>,
}

impl Trade {
    /// Creates a closed trade; duration is derived from the entry/exit dates.
    #[must_use]
    pub fn new(
        entry_date: NaiveDate,
        exit_date: NaiveDate,
        entry_bar: usize,
        exit_bar: usize,
        return_pct: f64,
    ) -> Self {
        Self {
            entry_date,
            exit_date,
            entry_bar,
            exit_bar,
            return_pct,
            duration_days: (exit_date - entry_date).num_days(),
            symbol: None,
            strategy: None,
        }
    }

    /// Attaches the instrument label.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Attaches the strategy signature.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// True if the trade won.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.return_pct > 0.0
    }
}

/// Append-only ordered collection of trades accumulated across runs.
///
/// Insertion order is append order, not chronological: the walk-forward
/// driver appends windows newest-first, and the batch runner appends chunks
/// in completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeLedger {
    trades: Vec<Trade>,
}

impl TradeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn extend(&mut self, trades: impl IntoIterator<Item = Trade>) {
        self.trades.extend(trades);
    }

    /// Appends every trade of another ledger, preserving its order.
    pub fn merge(&mut self, other: TradeLedger) {
        self.trades.extend(other.trades);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    #[must_use]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trade> {
        self.trades.iter()
    }
}

impl FromIterator<Trade> for TradeLedger {
    fn from_iter<I: IntoIterator<Item = Trade>>(iter: I) -> Self {
        Self {
            trades: iter.into_iter().collect(),
        }
    }
}
