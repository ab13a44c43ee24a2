//! Backward-walking in-sample/out-of-sample window planning.
//!
//! Windows are produced newest-first: the first window ends at the series'
//! last date, each following window ends where the previous one's in-sample
//! range began its out-of-sample range. The sequence terminates on its own
//! once the remaining in-sample history gets too thin; a too-short series
//! simply yields nothing.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use walkforward_core::{BacktestError, PriceSeries};

/// One in-sample/out-of-sample window pair.
///
/// In-sample range is `[start, mid)`, out-of-sample range is `[mid, end)`.
/// Invariant: `start < mid < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub start: NaiveDate,
    pub mid: NaiveDate,
    pub end: NaiveDate,
}

impl WindowSpec {
    /// Human-readable identifier used when reporting skipped windows.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}..{}..{}", self.start, self.mid, self.end)
    }
}

/// Configuration for the window planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowPlannerConfig {
    /// In-sample period length in years.
    pub in_period_years: f64,
    /// Out-of-sample period length in years.
    pub out_period_years: f64,
    /// Minimum fraction of the in-sample period that must be covered by
    /// actual data for a window to be usable.
    pub tolerance: f64,
}

impl WindowPlannerConfig {
    /// Creates a config with the default tolerance of 0.9.
    #[must_use]
    pub fn new(in_period_years: f64, out_period_years: f64) -> Self {
        Self {
            in_period_years,
            out_period_years,
            tolerance: 0.9,
        }
    }

    /// Sets a custom tolerance factor.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Plans the backward walk of window pairs over a series.
pub struct WindowPlanner {
    in_days: i64,
    out_days: i64,
    min_span_days: f64,
}

impl WindowPlanner {
    /// # Errors
    /// [`BacktestError::InvalidConfig`] on non-positive periods or a
    /// tolerance outside `(0, 1]` — these are programmer errors, not data
    /// conditions, and fail fast.
    pub fn new(config: &WindowPlannerConfig) -> Result<Self, BacktestError> {
        if config.in_period_years <= 0.0 {
            return Err(BacktestError::InvalidConfig(
                "in_period_years must be > 0".into(),
            ));
        }
        if config.out_period_years <= 0.0 {
            return Err(BacktestError::InvalidConfig(
                "out_period_years must be > 0".into(),
            ));
        }
        if config.tolerance <= 0.0 || config.tolerance > 1.0 {
            return Err(BacktestError::InvalidConfig(
                "tolerance must be in (0, 1]".into(),
            ));
        }

        Ok(Self {
            in_days: (365.0 * config.in_period_years).round() as i64,
            out_days: (365.0 * config.out_period_years).round() as i64,
            min_span_days: 365.0 * config.in_period_years * config.tolerance,
        })
    }

    /// Returns a lazy, finite iterator of windows over `series`.
    ///
    /// Calling this again restarts the walk from the series end.
    #[must_use]
    pub fn windows<'a>(&self, series: &'a PriceSeries) -> Windows<'a> {
        Windows {
            series,
            end: series.last_date(),
            in_days: self.in_days,
            out_days: self.out_days,
            min_span_days: self.min_span_days,
        }
    }
}

/// Iterator state for one backward walk. See [`WindowPlanner::windows`].
pub struct Windows<'a> {
    series: &'a PriceSeries,
    end: Option<NaiveDate>,
    in_days: i64,
    out_days: i64,
    min_span_days: f64,
}

impl Iterator for Windows<'_> {
    type Item = WindowSpec;

    fn next(&mut self) -> Option<WindowSpec> {
        let end = self.end?;
        let mid = end - Duration::days(self.out_days);
        let start = mid - Duration::days(self.in_days);

        // Enough in-sample history must actually exist in [start, mid);
        // fewer than two bars or a span below tolerance ends the walk.
        let span = self.series.span_days(start, mid);
        match span {
            Some(days) if days as f64 >= self.min_span_days => {
                debug!(%start, %mid, %end, span_days = days, "planned window");
                self.end = Some(mid);
                Some(WindowSpec { start, mid, end })
            }
            _ => {
                self.end = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use walkforward_core::Bar;

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

    fn planner(in_years: f64, out_years: f64) -> WindowPlanner {
        WindowPlanner::new(&WindowPlannerConfig::new(in_years, out_years)).unwrap()
    }

    // ============================================================
    // Config validation
    // ============================================================

    #[test]
    fn rejects_non_positive_in_period() {
        let result = WindowPlanner::new(&WindowPlannerConfig::new(0.0, 1.0));
        assert!(matches!(result, Err(BacktestError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_non_positive_out_period() {
        let result = WindowPlanner::new(&WindowPlannerConfig::new(3.0, -1.0));
        assert!(matches!(result, Err(BacktestError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_tolerance_outside_unit_interval() {
        let config = WindowPlannerConfig::new(3.0, 1.0).with_tolerance(1.5);
        assert!(matches!(
            WindowPlanner::new(&config),
            Err(BacktestError::InvalidConfig(_))
        ));
    }

    #[test]
    fn default_tolerance_is_point_nine() {
        let config = WindowPlannerConfig::new(3.0, 1.0);
        assert!((config.tolerance - 0.9).abs() < f64::EPSILON);
    }

    // ============================================================
    // Window arithmetic
    // ============================================================

    #[test]
    fn first_window_ends_at_series_end() {
        let series = daily_series(365 * 5);
        let spec = planner(2.0, 1.0).windows(&series).next().unwrap();

        assert_eq!(spec.end, series.last_date().unwrap());
        assert_eq!(spec.mid, spec.end - Duration::days(365));
        assert_eq!(spec.start, spec.mid - Duration::days(730));
    }

    #[test]
    fn windows_walk_backward_adjacent() {
        let series = daily_series(365 * 10);
        let specs: Vec<WindowSpec> = planner(3.0, 1.0).windows(&series).collect();

        assert!(specs.len() >= 2);
        for pair in specs.windows(2) {
            assert_eq!(pair[1].end, pair[0].mid);
        }
    }

    #[test]
    fn every_window_is_ordered() {
        let series = daily_series(365 * 10);
        for spec in planner(3.0, 1.0).windows(&series) {
            assert!(spec.start < spec.mid);
            assert!(spec.mid < spec.end);
        }
    }

    // ============================================================
    // Termination
    // ============================================================

    #[test]
    fn sequence_is_finite() {
        let series = daily_series(365 * 10);
        let count = planner(3.0, 1.0).windows(&series).count();
        assert!(count >= 5);
        assert!(count < 10);
    }

    #[test]
    fn series_below_tolerance_yields_nothing() {
        // Spanning exactly tau * P_in * 365 - 1 days with P_out = 1 year.
        let in_years = 2.0;
        let total_days = (365.0 * in_years * 0.9) as i64 - 1;
        let series = daily_series(total_days + 1);

        assert_eq!(planner(in_years, 1.0).windows(&series).count(), 0);
    }

    #[test]
    fn two_in_periods_of_history_yield_at_least_one_window() {
        let series = daily_series(365 * 2 + 1);
        assert!(planner(1.0, 1.0).windows(&series).count() >= 1);
    }

    #[test]
    fn empty_series_yields_nothing() {
        let series = daily_series(0);
        assert_eq!(planner(3.0, 1.0).windows(&series).count(), 0);
    }

    #[test]
    fn walk_is_restartable() {
        let series = daily_series(365 * 10);
        let planner = planner(3.0, 1.0);

        let first: Vec<WindowSpec> = planner.windows(&series).collect();
        let second: Vec<WindowSpec> = planner.windows(&series).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn fractional_years_are_supported() {
        let series = daily_series(365 * 3);
        let specs: Vec<WindowSpec> = planner(1.5, 0.5).windows(&series).collect();

        assert!(!specs.is_empty());
        let spec = specs[0];
        assert_eq!(spec.end - spec.mid, Duration::days(183));
        assert_eq!(spec.mid - spec.start, Duration::days(548));
    }
}
