//! CSV-backed price series loading.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use walkforward_core::{Bar, BacktestError, DataSource, DataSourceErrorKind, PriceSeries};

#[derive(Debug, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl From<CsvBar> for Bar {
    fn from(row: CsvBar) -> Self {
        Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Loads one `<symbol>.csv` file per symbol from a root directory.
///
/// Expected header: `date,open,high,low,close,volume` with ISO dates.
/// Rows are sorted by date before series construction, so unordered files
/// load fine; duplicate dates are rejected by the series itself.
pub struct CsvDataSource {
    root: PathBuf,
}

impl CsvDataSource {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for CsvDataSource {
    fn load(&self, symbol: &str) -> Result<PriceSeries, BacktestError> {
        let path = self.root.join(format!("{symbol}.csv"));
        if !path.is_file() {
            return Err(BacktestError::DataSource {
                symbol: symbol.to_string(),
                kind: DataSourceErrorKind::NotFound,
            });
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| BacktestError::InvalidSeries(format!("{}: {e}", path.display())))?;

        let mut bars: Vec<Bar> = Vec::new();
        for row in reader.deserialize::<CsvBar>() {
            let row =
                row.map_err(|e| BacktestError::InvalidSeries(format!("{}: {e}", path.display())))?;
            bars.push(row.into());
        }

        if bars.is_empty() {
            return Err(BacktestError::DataSource {
                symbol: symbol.to_string(),
                kind: DataSourceErrorKind::Empty,
            });
        }

        bars.sort_by_key(|b| b.date);
        debug!(symbol, rows = bars.len(), "loaded price series");
        PriceSeries::new(bars)
    }
}
