//! Monte Carlo resampling of a trade ledger into one-year equity paths.
//!
//! Assuming historical trades are independent draws, resampling them with
//! replacement and compounding their returns until a year of holding time
//! has accumulated yields the distribution of annual outcomes the strategy
//! can produce. Each path reports its terminal return, maximum drawdown,
//! and whether equity ever fell below the ruin threshold.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use walkforward_core::{BacktestError, TradeLedger};

/// Default number of simulated paths per run.
pub const DEFAULT_NUM_PATHS: usize = 1500;

/// Configuration for the Monte Carlo engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Starting asset value of every path.
    pub initial_assets: f64,
    /// Asset level below which a path counts as ruined.
    pub ruin_point: f64,
    /// Seed for the engine-owned random source.
    pub seed: u64,
    /// Holding time one path must accumulate, in days.
    pub horizon_days: i64,
}

impl MonteCarloConfig {
    /// Creates a config with the default seed (2022) and one-year horizon.
    #[must_use]
    pub fn new(initial_assets: f64, ruin_point: f64) -> Self {
        Self {
            initial_assets,
            ruin_point,
            seed: 2022,
            horizon_days: 365,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_horizon_days(mut self, horizon_days: i64) -> Self {
        self.horizon_days = horizon_days;
        self
    }
}

/// Outcome of one simulated path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathOutcome {
    /// `last_value / initial_assets - 1`.
    pub terminal_return: f64,
    /// `min(value / running_max - 1)` over the path; zero or negative.
    pub max_drawdown: f64,
    /// True if any value fell below the ruin point.
    pub ruined: bool,
}

/// Per-path outcome lists collected by [`MonteCarloEngine::run`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResults {
    pub returns: Vec<f64>,
    pub drawdowns: Vec<f64>,
    pub ruins: Vec<bool>,
}

impl MonteCarloResults {
    /// Aggregates medians and the ruin fraction.
    #[must_use]
    pub fn summary(&self) -> MonteCarloSummary {
        let ruined = self.ruins.iter().filter(|&&r| r).count();
        MonteCarloSummary {
            median_return: median(&self.returns),
            median_drawdown: median(&self.drawdowns),
            ruin_fraction: if self.ruins.is_empty() {
                0.0
            } else {
                ruined as f64 / self.ruins.len() as f64
            },
        }
    }
}

/// Aggregate view over all simulated paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub median_return: f64,
    pub median_drawdown: f64,
    pub ruin_fraction: f64,
}

impl MonteCarloSummary {
    /// `|median return| / |median drawdown|`; `None` when the drawdown
    /// median is zero.
    #[must_use]
    pub fn risk_reward_ratio(&self) -> Option<f64> {
        if self.median_drawdown == 0.0 {
            None
        } else {
            Some(self.median_return.abs() / self.median_drawdown.abs())
        }
    }

    /// Reporting heuristic: a ratio below ~1.5 signals an unattractive
    /// risk/reward profile. Never gates execution.
    #[must_use]
    pub fn is_attractive(&self, threshold: f64) -> bool {
        self.risk_reward_ratio().is_some_and(|ratio| ratio >= threshold)
    }
}

/// Resamples a trade ledger into synthetic equity paths.
pub struct MonteCarloEngine {
    ledger: TradeLedger,
    config: MonteCarloConfig,
    rng: ChaCha8Rng,
}

impl MonteCarloEngine {
    /// # Errors
    /// [`BacktestError::InvalidConfig`] when the ledger is empty, when no
    /// trade has positive duration (the resampling loop could never reach
    /// the horizon), or when the initial assets are not positive.
    pub fn new(ledger: TradeLedger, config: MonteCarloConfig) -> Result<Self, BacktestError> {
        if ledger.is_empty() {
            return Err(BacktestError::InvalidConfig(
                "monte carlo requires a non-empty trade ledger".into(),
            ));
        }
        if !ledger.iter().any(|t| t.duration_days > 0) {
            return Err(BacktestError::InvalidConfig(
                "monte carlo requires at least one trade with positive duration".into(),
            ));
        }
        if config.initial_assets <= 0.0 {
            return Err(BacktestError::InvalidConfig(
                "initial_assets must be > 0".into(),
            ));
        }

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            ledger,
            config,
            rng,
        })
    }

    /// Simulates one path: draw trades uniformly with replacement,
    /// compounding each return, until a horizon of holding time accumulates.
    pub fn simulate_one_path(&mut self) -> PathOutcome {
        let trades = self.ledger.trades();
        let mut values = vec![self.config.initial_assets];
        let mut value = self.config.initial_assets;
        let mut held_days = 0i64;

        while held_days < self.config.horizon_days {
            let trade = &trades[self.rng.gen_range(0..trades.len())];
            held_days += trade.duration_days;
            value *= 1.0 + trade.return_pct;
            values.push(value);
        }

        outcome_of(&values, self.config.initial_assets, self.config.ruin_point)
    }

    /// Runs `num_paths` independent path simulations.
    ///
    /// Paths draw from the engine-owned random source in sequence, so the
    /// same seed over the same ledger reproduces identical outcome lists.
    pub fn run(&mut self, num_paths: usize) -> MonteCarloResults {
        let mut results = MonteCarloResults {
            returns: Vec::with_capacity(num_paths),
            drawdowns: Vec::with_capacity(num_paths),
            ruins: Vec::with_capacity(num_paths),
        };

        for _ in 0..num_paths {
            let outcome = self.simulate_one_path();
            results.returns.push(outcome.terminal_return);
            results.drawdowns.push(outcome.max_drawdown);
            results.ruins.push(outcome.ruined);
        }

        results
    }
}

fn outcome_of(values: &[f64], initial_assets: f64, ruin_point: f64) -> PathOutcome {
    let mut running_max = f64::MIN;
    let mut max_drawdown = 0.0f64;
    let mut ruined = false;
    let mut last = initial_assets;

    for &value in values {
        running_max = running_max.max(value);
        max_drawdown = max_drawdown.min(value / running_max - 1.0);
        ruined = ruined || value < ruin_point;
        last = value;
    }

    PathOutcome {
        terminal_return: last / initial_assets - 1.0,
        max_drawdown,
        ruined,
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
