//! CSV export of ranked scan results.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use crate::domain::error::ScanError;
use crate::domain::scan::{ScanReport, ScanResult};
use crate::domain::trade_plan::round2;
use crate::ports::result_sink::ResultSink;

#[derive(Debug, serde::Serialize)]
struct ExportRow<'a> {
    symbol: &'a str,
    classification: &'static str,
    date: String,
    cmp: f64,
    daily_resistance: f64,
    weekly_resistance: f64,
    avg_volume: f64,
    entry: f64,
    stop_loss: f64,
    target: f64,
    quantity: u64,
    risk_per_unit: f64,
    rsi: f64,
    volume_multiple: f64,
}

impl<'a> From<&'a ScanResult> for ExportRow<'a> {
    fn from(r: &'a ScanResult) -> Self {
        Self {
            symbol: &r.symbol,
            classification: r.classification.label(),
            date: r.date.format("%Y-%m-%d").to_string(),
            cmp: r.cmp,
            daily_resistance: r.daily_resistance,
            weekly_resistance: r.weekly_resistance,
            avg_volume: r.avg_volume.round(),
            entry: r.entry,
            stop_loss: r.stop_loss,
            target: r.target,
            quantity: r.quantity,
            risk_per_unit: r.risk_per_unit,
            rsi: round2(r.rsi),
            volume_multiple: round2(r.volume_multiple),
        }
    }
}

/// Write every result as one CSV row, header included even when empty.
pub fn write_results<W: Write>(writer: W, results: &[ScanResult]) -> Result<(), ScanError> {
    let export_err = |e: csv::Error| ScanError::Export {
        reason: e.to_string(),
    };

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record([
        "symbol",
        "classification",
        "date",
        "cmp",
        "daily_resistance",
        "weekly_resistance",
        "avg_volume",
        "entry",
        "stop_loss",
        "target",
        "quantity",
        "risk_per_unit",
        "rsi",
        "volume_multiple",
    ])
    .map_err(export_err)?;

    for result in results {
        wtr.serialize(ExportRow::from(result)).map_err(export_err)?;
    }
    wtr.flush()?;
    Ok(())
}

pub struct CsvExportSink {
    path: PathBuf,
}

impl CsvExportSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ResultSink for CsvExportSink {
    fn deliver(&self, report: &ScanReport) -> Result<(), ScanError> {
        let file = File::create(&self.path).map_err(|e| ScanError::Export {
            reason: format!("cannot create {}: {}", self.path.display(), e),
        })?;
        write_results(file, &report.results)?;
        tracing::info!(
            path = %self.path.display(),
            rows = report.results.len(),
            "exported scan results"
        );
        Ok(())
    }
}
