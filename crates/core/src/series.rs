//! Daily OHLCV price series.
//!
//! A [`PriceSeries`] is owned by the caller and read-only to every component
//! in this workspace: slicing returns a new series, never a mutation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BacktestError;

/// One daily bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// An ordered sequence of daily bars with strictly increasing, unique dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Builds a series from bars, enforcing the date ordering invariant.
    ///
    /// # Errors
    /// Returns [`BacktestError::InvalidSeries`] if any date is not strictly
    /// greater than its predecessor.
    pub fn new(bars: Vec<Bar>) -> Result<Self, BacktestError> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                warn!(prev = %pair[0].date, next = %pair[1].date, "rejecting unordered series");
                return Err(BacktestError::InvalidSeries(format!(
                    "dates must be strictly increasing, got {} after {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        Ok(Self { bars })
    }

    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Returns the bars falling in `[start, end)` as a new series.
    #[must_use]
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date < end)
            .cloned()
            .collect();
        Self { bars }
    }

    /// Number of bars in `[start, end)`.
    #[must_use]
    pub fn bar_count(&self, start: NaiveDate, end: NaiveDate) -> usize {
        self.bars
            .iter()
            .filter(|b| b.date >= start && b.date < end)
            .count()
    }

    /// Calendar-day span between the first and last bar actually present in
    /// `[start, end)`. `None` when the range holds fewer than two bars.
    #[must_use]
    pub fn span_days(&self, start: NaiveDate, end: NaiveDate) -> Option<i64> {
        let mut dates = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date < end)
            .map(|b| b.date);
        let first = dates.next()?;
        let last = dates.last()?;
        Some((last - first).num_days())
    }
}
