//! Per-run summary statistics and the optimization objective.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::params::ParameterSet;
use crate::trade::Trade;

/// Settings forwarded to the external backtest engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Starting cash for the simulated account.
    pub cash: f64,
    /// Commission per trade as a ratio (0.002 = 0.2%).
    pub commission: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            cash: 100_000.0,
            commission: 0.002,
        }
    }
}

/// What the optimizer should do with a named statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    Maximize(String),
    Minimize(String),
}

impl Objective {
    /// Name of the statistic this objective targets.
    #[must_use]
    pub fn metric(&self) -> &str {
        match self {
            Self::Maximize(name) | Self::Minimize(name) => name,
        }
    }

    /// True if `candidate` scores better than `incumbent` under this objective.
    #[must_use]
    pub fn improves(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Maximize(_) => candidate > incumbent,
            Self::Minimize(_) => candidate < incumbent,
        }
    }
}

/// Result bundle from one backtest execution: the named summary statistics
/// plus the trade ledger for that run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
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
    /// Parameters the run was executed with.
    pub params: ParameterSet,
    /// Closed trades of this run, in close order.
    pub trades: Vec<Trade>,
}

impl RunStatistics {
    /// Aggregates the summary statistics from a run's closed trades.
    #[must_use]
    pub fn from_trades(
        start: NaiveDate,
        end: NaiveDate,
        params: ParameterSet,
        trades: Vec<Trade>,
    ) -> Self {
        let trade_count = trades.len();
        let n = trade_count as f64;

        let (win_rate_pct, best, worst, avg, max_dur, avg_dur) = if trades.is_empty() {
            (0.0, 0.0, 0.0, 0.0, 0, 0.0)
        } else {
            let wins = trades.iter().filter(|t| t.is_win()).count();
            let best = trades.iter().map(|t| t.return_pct).fold(f64::MIN, f64::max);
            let worst = trades.iter().map(|t| t.return_pct).fold(f64::MAX, f64::min);
            let avg = trades.iter().map(|t| t.return_pct).sum::<f64>() / n;
            let max_dur = trades.iter().map(|t| t.duration_days).max().unwrap_or(0);
            let avg_dur = trades.iter().map(|t| t.duration_days).sum::<i64>() as f64 / n;
            (wins as f64 / n * 100.0, best * 100.0, worst * 100.0, avg * 100.0, max_dur, avg_dur)
        };

        let span = (end - start).num_days();
        let held: i64 = trades.iter().map(|t| t.duration_days).sum();
        let exposure_pct = if span > 0 {
            (held as f64 / span as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        Self {
            start,
            end,
            exposure_pct,
            trade_count,
            win_rate_pct,
            best_trade_pct: best,
            worst_trade_pct: worst,
            avg_trade_pct: avg,
            max_trade_duration_days: max_dur,
            avg_trade_duration_days: avg_dur,
            params,
            trades,
        }
    }

    /// Looks up a numeric summary statistic by name, for objective scoring.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "exposure_pct" => Some(self.exposure_pct),
            "trade_count" => Some(self.trade_count as f64),
            "win_rate_pct" => Some(self.win_rate_pct),
            "best_trade_pct" => Some(self.best_trade_pct),
            "worst_trade_pct" => Some(self.worst_trade_pct),
            "avg_trade_pct" => Some(self.avg_trade_pct),
            "max_trade_duration_days" => Some(self.max_trade_duration_days as f64),
            "avg_trade_duration_days" => Some(self.avg_trade_duration_days),
            _ => None,
        }
    }
}
