//! Batched parallel backtesting across independent instruments.
//!
//! Inputs are partitioned into chunks and each chunk runs on its own
//! blocking worker; workers share nothing and never communicate mid-task.
//! Results are gathered in completion order, so callers must not depend on
//! ledger row order, only on membership.

use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use walkforward_core::{
    BacktestEngine, DataSource, PriceSeries, StrategyTemplate, Trade, TradeLedger,
};

/// Upper bound on instruments per chunk, to bound per-task memory and keep
/// progress granular on very large inputs.
pub const MAX_CHUNK_SIZE: usize = 300;

/// Configuration for the batch runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of parallel workers to size chunks for.
    pub worker_count: usize,
    /// When false, run the same per-chunk logic sequentially in-process.
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            worker_count: thread::available_parallelism().map_or(1, usize::from),
            parallel: true,
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Merged outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Trades from all completed chunks, in completion order.
    pub ledger: TradeLedger,
    /// Instruments skipped because their run or load failed.
    pub skipped: Vec<String>,
    /// Chunks lost entirely to a worker failure.
    pub failed_chunks: usize,
}

/// Chunk size for `len` inputs over `worker_count` workers:
/// `clamp(len / worker_count, 1, MAX_CHUNK_SIZE)`.
#[must_use]
pub fn chunk_size(len: usize, worker_count: usize) -> usize {
    (len / worker_count.max(1)).clamp(1, MAX_CHUNK_SIZE)
}

/// Splits `items` into consecutive chunks of `size` (the last may be short).
#[must_use]
pub fn partition<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut chunks = Vec::new();
    let mut rest = items;
    while rest.len() > size {
        let tail = rest.split_off(size);
        chunks.push(rest);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

/// Runs one strategy across many independent instruments.
pub struct BatchRunner {
    engine: Arc<dyn BacktestEngine>,
    config: BatchConfig,
}

impl BatchRunner {
    #[must_use]
    pub fn new(engine: Arc<dyn BacktestEngine>, config: BatchConfig) -> Self {
        Self { engine, config }
    }

    /// Loads each symbol from `source` and runs the loaded series as a batch.
    ///
    /// Instruments the source cannot produce (not found, empty) are skipped
    /// and reported, never fatal.
    pub async fn run_symbols(
        &self,
        source: &dyn DataSource,
        symbols: &[String],
        strategy: &StrategyTemplate,
    ) -> BatchReport {
        let mut pairs = Vec::with_capacity(symbols.len());
        let mut skipped = Vec::new();

        for symbol in symbols {
            match source.load(symbol) {
                Ok(series) => pairs.push((series, symbol.clone())),
                Err(err) => {
                    warn!(symbol = %symbol, %err, "skipping instrument: load failed");
                    skipped.push(symbol.clone());
                }
            }
        }

        let mut report = self.run_many(pairs, strategy).await;
        report.skipped.extend(skipped);
        report
    }

    /// Runs every `(series, label)` pair through a single unconstrained
    /// backtest and merges the surviving trades into one ledger.
    pub async fn run_many(
        &self,
        pairs: Vec<(PriceSeries, String)>,
        strategy: &StrategyTemplate,
    ) -> BatchReport {
        if pairs.is_empty() {
            return BatchReport::default();
        }

        let size = chunk_size(pairs.len(), self.config.worker_count);
        let chunks = partition(pairs, size);
        info!(
            chunks = chunks.len(),
            chunk_size = size,
            workers = self.config.worker_count,
            "dispatching batch"
        );

        if !self.config.parallel {
            info!("sequential mode requested, running batch in-process");
            self.run_sequential(chunks, strategy)
        } else if self.config.worker_count <= 1 {
            warn!("parallel workers unavailable, running batch sequentially");
            self.run_sequential(chunks, strategy)
        } else {
            self.run_parallel(chunks, strategy).await
        }
    }

    async fn run_parallel(
        &self,
        chunks: Vec<Vec<(PriceSeries, String)>>,
        strategy: &StrategyTemplate,
    ) -> BatchReport {
        let mut set = JoinSet::new();
        for chunk in chunks {
            let engine = Arc::clone(&self.engine);
            let strategy = strategy.clone();
            set.spawn_blocking(move || run_chunk(engine.as_ref(), chunk, &strategy));
        }

        let mut report = BatchReport::default();
        // Gathered in completion order, not submission order.
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(chunk_report) => merge_chunk(&mut report, chunk_report),
                Err(err) => {
                    error!(%err, "batch chunk worker failed; its results are lost");
                    report.failed_chunks += 1;
                }
            }
        }
        report
    }

    fn run_sequential(
        &self,
        chunks: Vec<Vec<(PriceSeries, String)>>,
        strategy: &StrategyTemplate,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for chunk in chunks {
            let chunk_report = run_chunk(self.engine.as_ref(), chunk, strategy);
            merge_chunk(&mut report, chunk_report);
        }
        report
    }
}

struct ChunkReport {
    ledger: TradeLedger,
    skipped: Vec<String>,
}

fn merge_chunk(report: &mut BatchReport, chunk: ChunkReport) {
    report.ledger.merge(chunk.ledger);
    report.skipped.extend(chunk.skipped);
}

fn run_chunk(
    engine: &dyn BacktestEngine,
    chunk: Vec<(PriceSeries, String)>,
    strategy: &StrategyTemplate,
) -> ChunkReport {
    let mut ledger = TradeLedger::new();
    let mut skipped = Vec::new();

    for (series, label) in chunk {
        match engine.run_default(&series, strategy) {
            Ok(stats) => {
                let end = stats.end;
                ledger.extend(
                    stats
                        .trades
                        .into_iter()
                        .filter(|t| t.exit_date != end)
                        .map(|t: Trade| t.with_symbol(label.clone())),
                );
            }
            Err(err) => {
                warn!(symbol = %label, %err, "skipping instrument: backtest failed");
                skipped.push(label);
            }
        }
    }

    ChunkReport { ledger, skipped }
}
