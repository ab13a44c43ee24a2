//! End-to-end flow: window planning, grid optimization, walk-forward
//! accumulation, and Monte Carlo resampling of the resulting ledger.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal_macros::dec;

use walkforward_core::{
    BacktestConfig, BacktestEngine, BacktestError, Bar, Objective, ParameterSet, PriceSeries,
    RunStatistics, StrategyTemplate,
};
use walkforward_engine::{
    Constraint, MonteCarloConfig, MonteCarloEngine, ParameterGrid, WalkForwardConfig,
    WalkForwardDriver,
};

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 4).unwrap() + Duration::days(offset)
}

fn daily_series(days: i64) -> PriceSeries {
    let bars = (0..days)
        .map(|i| Bar {
            date: day(i),
            open: dec!(100),
            high: dec!(101),
            low: dec!(99),
            close: dec!(100),
            volume: dec!(1),
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

/// Deterministic stand-in for a real backtest engine.
///
/// Trades hold for `n2 - n1` bars and return `(n2 - n1) / 100`, entered
/// every 100 bars, plus one trade forced shut at the very last bar of the
/// slice. Wider parameter spreads therefore score better, so optimization
/// has a known winner.
struct GridSearchEngine;

impl GridSearchEngine {
    fn run(series: &PriceSeries, params: &ParameterSet) -> Result<RunStatistics, BacktestError> {
        let n1 = params
            .get("n1")
            .ok_or_else(|| BacktestError::Engine("missing n1".into()))?;
        let n2 = params
            .get("n2")
            .ok_or_else(|| BacktestError::Engine("missing n2".into()))?;

        let bars = series.bars();
        let last = bars.len() - 1;
        let hold = ((n2 - n1) as usize).max(1);
        let return_pct = (n2 - n1) / 100.0;

        let mut trades = Vec::new();
        let mut entry = 0usize;
        while entry + hold < last {
            trades.push(walkforward_core::Trade::new(
                bars[entry].date,
                bars[entry + hold].date,
                entry,
                entry + hold,
                return_pct,
            ));
            entry += 100;
        }
        // Position still open at slice end, closed by force.
        trades.push(walkforward_core::Trade::new(
            bars[last - hold].date,
            bars[last].date,
            last - hold,
            last,
            return_pct,
        ));

        Ok(RunStatistics::from_trades(
            bars[0].date,
            bars[last].date,
            params.clone(),
            trades,
        ))
    }
}

impl BacktestEngine for GridSearchEngine {
    fn optimize(
        &self,
        series: &PriceSeries,
        _strategy: &StrategyTemplate,
        candidates: &[ParameterSet],
        objective: &Objective,
        _config: &BacktestConfig,
    ) -> Result<RunStatistics, BacktestError> {
        let mut best: Option<RunStatistics> = None;
        for candidate in candidates {
            let stats = Self::run(series, candidate)?;
            let score = stats
                .metric(objective.metric())
                .ok_or_else(|| BacktestError::Engine(format!("unknown metric {}", objective.metric())))?;
            let replace = match &best {
                None => true,
                Some(incumbent) => {
                    let incumbent_score = incumbent
                        .metric(objective.metric())
                        .unwrap_or(f64::NEG_INFINITY);
                    objective.improves(score, incumbent_score)
                }
            };
            if replace {
                best = Some(stats);
            }
        }
        best.ok_or(BacktestError::NoValidParameters)
    }

    fn run_fixed(
        &self,
        series: &PriceSeries,
        _strategy: &StrategyTemplate,
        params: &ParameterSet,
        _config: &BacktestConfig,
    ) -> Result<RunStatistics, BacktestError> {
        Self::run(series, params)
    }

    fn run_default(
        &self,
        series: &PriceSeries,
        strategy: &StrategyTemplate,
    ) -> Result<RunStatistics, BacktestError> {
        Self::run(series, &strategy.defaults)
    }
}

fn sma_grid() -> ParameterGrid {
    ParameterGrid::new()
        .with_axis("n1", vec![5.0, 10.0])
        .with_axis("n2", vec![20.0, 30.0])
        .with_constraint(Constraint::LessThan {
            left: "n1".into(),
            right: "n2".into(),
        })
}

fn run_walk_forward() -> walkforward_engine::WalkForwardReport {
    let series = daily_series(365 * 10);
    let config = WalkForwardConfig::new(3.0, 1.0, Objective::Maximize("avg_trade_pct".into()));
    let driver = WalkForwardDriver::new(Arc::new(GridSearchEngine), config);
    driver
        .run(&series, &StrategyTemplate::new("sma_cross"), &sma_grid())
        .unwrap()
}

#[test]
fn ten_years_of_daily_data_produce_the_expected_walk() {
    let report = run_walk_forward();

    // 10 years of history with 3-year in-sample and 1-year out-of-sample
    // windows supports seven backward steps before tolerance cuts off.
    assert_eq!(report.rows.len(), 7);
    assert!(report.skipped.is_empty());

    for row in &report.rows {
        // The widest spread (n1=5, n2=30) wins every in-sample search.
        assert_eq!(row.params.get("n1"), Some(5.0));
        assert_eq!(row.params.get("n2"), Some(30.0));
        assert!(row.start < row.end);
        assert!(row.trade_count > 0);
        assert!((row.avg_trade_pct - 25.0).abs() < 1e-9);
    }
}

#[test]
fn boundary_closed_trades_never_reach_the_ledger() {
    let report = run_walk_forward();

    // Each out-of-sample slice has 365 bars, so its boundary index is 364.
    assert!(!report.ledger.is_empty());
    assert!(report.ledger.iter().all(|t| t.exit_bar != 364));

    // Four interior trades survive per window out of the five produced.
    assert_eq!(report.ledger.len(), report.rows.len() * 4);
}

#[test]
fn ledger_trades_carry_winning_parameter_provenance() {
    let report = run_walk_forward();
    assert!(report
        .ledger
        .iter()
        .all(|t| t.strategy.as_deref() == Some("sma_cross(n1=5,n2=30)")));
}

#[test]
fn walk_forward_ledger_feeds_monte_carlo() {
    let report = run_walk_forward();

    let config = MonteCarloConfig::new(1000.0, 100.0).with_seed(11);
    let mut engine = MonteCarloEngine::new(report.ledger.clone(), config.clone()).unwrap();
    let results = engine.run(100);

    assert_eq!(results.returns.len(), 100);
    // Every resampled trade gains 25%, so paths only compound upward.
    assert!(results.returns.iter().all(|&r| r > 0.0));
    assert!(results.ruins.iter().all(|&ruined| !ruined));

    let summary = results.summary();
    assert!(summary.median_return > 0.0);
    assert!((summary.ruin_fraction).abs() < f64::EPSILON);

    // Same ledger, same seed, same outcomes.
    let mut replay = MonteCarloEngine::new(report.ledger, config).unwrap();
    assert_eq!(replay.run(100).returns, results.returns);
}
