//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<CODE>.csv`, with a header row and columns
//! `date,open,high,low,close,volume` (date as YYYY-MM-DD).

use crate::domain::error::ScanError;
use crate::domain::ohlcv::{normalize_series, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }

    fn unavailable(code: &str, reason: String) -> ScanError {
        ScanError::DataUnavailable {
            code: code.to_string(),
            reason,
        }
    }

    fn field<T: FromStr>(
        code: &str,
        record: &csv::StringRecord,
        index: usize,
        name: &str,
    ) -> Result<T, ScanError>
    where
        T::Err: std::fmt::Display,
    {
        let raw = record
            .get(index)
            .ok_or_else(|| Self::unavailable(code, format!("missing {} column", name)))?;
        raw.trim()
            .parse()
            .map_err(|e| Self::unavailable(code, format!("invalid {} value {:?}: {}", name, raw, e)))
    }

    fn parse_bar(code: &str, record: &csv::StringRecord) -> Result<OhlcvBar, ScanError> {
        let date_str = record
            .get(0)
            .ok_or_else(|| Self::unavailable(code, "missing date column".into()))?;
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
            .map_err(|e| Self::unavailable(code, format!("invalid date format: {}", e)))?;

        // some exports write volume as a float
        let volume: f64 = Self::field(code, record, 5, "volume")?;

        Ok(OhlcvBar {
            code: code.to_string(),
            date,
            open: Self::field(code, record, 1, "open")?,
            high: Self::field(code, record, 2, "high")?,
            low: Self::field(code, record, 3, "low")?,
            close: Self::field(code, record, 4, "close")?,
            volume: volume.round() as i64,
        })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, code: &str, history: usize) -> Result<Vec<OhlcvBar>, ScanError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| {
            Self::unavailable(code, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| Self::unavailable(code, format!("CSV parse error: {}", e)))?;
            bars.push(Self::parse_bar(code, &record)?);
        }

        let mut bars = normalize_series(bars);
        if bars.len() > history {
            bars.drain(..bars.len() - history);
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            Self::unavailable(
                "*",
                format!("failed to read directory {}: {}", self.base_path.display(), e),
            )
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| Self::unavailable("*", format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(".csv") {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
