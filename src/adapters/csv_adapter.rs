//! CSV file price adapter.
//!
//! Reads `<base_path>/<instrument>.csv`. The header must name a `date`
//! column (`YYYY-MM-DD`) and a `close` column; an `adj_close` (or
//! `adj close`) column is used instead of `close` when present. Other
//! columns are ignored.

use crate::domain::error::EngineError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::config_port::DATE_FORMAT;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument))
    }
}

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

impl PriceSource for CsvAdapter {
    fn fetch(
        &self,
        instrument: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, EngineError> {
        let path = self.csv_path(instrument);
        debug!(path = %path.display(), "reading price file");
        let content = fs::read_to_string(&path).map_err(|e| {
            EngineError::data_unavailable(
                instrument,
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| EngineError::data_unavailable(instrument, format!("CSV header error: {e}")))?
            .clone();

        let date_col = column_index(&headers, &["date"])
            .ok_or_else(|| EngineError::data_unavailable(instrument, "missing date column"))?;
        let close_col = column_index(&headers, &["adj_close", "adj close"])
            .or_else(|| column_index(&headers, &["close"]))
            .ok_or_else(|| EngineError::data_unavailable(instrument, "missing close column"))?;

        let mut points = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| {
                EngineError::data_unavailable(instrument, format!("CSV parse error: {e}"))
            })?;
            // Header is line 1.
            let row = line + 2;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                EngineError::data_unavailable(
                    instrument,
                    format!("row {row}: invalid date {date_str:?}: {e}"),
                )
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let close_str = record.get(close_col).unwrap_or_default().trim();
            let close: f64 = close_str.parse().map_err(|e| {
                EngineError::data_unavailable(
                    instrument,
                    format!("row {row}: invalid close {close_str:?}: {e}"),
                )
            })?;

            points.push(PricePoint { date, close });
        }

        if points.is_empty() {
            return Err(EngineError::data_unavailable(
                instrument,
                format!("no rows between {start_date} and {end_date}"),
            ));
        }

        points.sort_by_key(|p| p.date);
        PriceSeries::new(instrument, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";
        fs::write(path.join("SPY.csv"), csv_content).unwrap();

        fs::write(
            path.join("ADJ.csv"),
            "Date,Close,Adj Close\n2024-01-15,100.0,95.5\n",
        )
        .unwrap();
        fs::write(path.join("EMPTY.csv"), "date,close\n").unwrap();
        fs::write(path.join("BAD.csv"), "date,close\n2024-01-15,abc\n").unwrap();
        fs::write(path.join("NOCLOSE.csv"), "date,open\n2024-01-15,1.0\n").unwrap();
        fs::write(
            path.join("DUP.csv"),
            "date,close\n2024-01-15,1.0\n2024-01-15,2.0\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_returns_sorted_closes() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch("SPY", date(2024, 1, 15), date(2024, 1, 17))
            .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.instrument(), "SPY");
        assert_eq!(series.first_date(), date(2024, 1, 15));
        assert_eq!(series.closes(), vec![105.0, 110.0, 115.0]);
    }

    #[test]
    fn fetch_range_is_inclusive() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch("SPY", date(2024, 1, 16), date(2024, 1, 16))
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].date, date(2024, 1, 16));
    }

    #[test]
    fn fetch_prefers_adjusted_close() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let series = adapter
            .fetch("ADJ", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert_eq!(series.closes(), vec![95.5]);
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter
            .fetch("XYZ", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable { .. }));
    }

    #[test]
    fn empty_range_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        for (instrument, start, end) in [
            ("EMPTY", date(2024, 1, 1), date(2024, 1, 31)),
            ("SPY", date(2023, 1, 1), date(2023, 12, 31)),
        ] {
            let err = adapter.fetch(instrument, start, end).unwrap_err();
            assert!(matches!(err, EngineError::DataUnavailable { .. }));
        }
    }

    #[test]
    fn bad_close_value_is_reported() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter
            .fetch("BAD", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn missing_close_column_is_reported() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter
            .fetch("NOCLOSE", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(err.to_string().contains("missing close column"));
    }

    #[test]
    fn duplicate_dates_are_malformed() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter
            .fetch("DUP", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedSeries { .. }));
    }
}
