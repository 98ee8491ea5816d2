//! Plain-text scan summary, the body of the daily notification.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::domain::error::ScanError;
use crate::domain::scan::ScanReport;
use crate::domain::universe::display_code;
use crate::ports::result_sink::ResultSink;

pub const EMPTY_MESSAGE: &str = "No breakout stocks found today.";

/// Render the message. `suffix` is stripped from symbols for display.
pub fn format_message(report: &ScanReport, date: NaiveDate, suffix: Option<&str>) -> String {
    if report.results.is_empty() {
        return format!("{EMPTY_MESSAGE}\n");
    }

    let mut msg = format!("Breakout Scan ({}):\n", date.format("%Y-%m-%d"));
    for r in &report.results {
        msg.push_str(&format!(
            "{} [{}] | CMP: {} | Buy: {} | SL: {} | Target: {} | Qty: {}\n",
            display_code(&r.symbol, suffix),
            r.classification,
            r.cmp,
            r.entry,
            r.stop_loss,
            r.target,
            r.quantity,
        ));
    }
    msg
}

/// Writes the message to a file, or to stdout when no path is set.
pub struct MessageSink {
    path: Option<PathBuf>,
    suffix: Option<String>,
}

impl MessageSink {
    pub fn new(path: Option<PathBuf>, suffix: Option<String>) -> Self {
        Self { path, suffix }
    }
}

impl ResultSink for MessageSink {
    fn deliver(&self, report: &ScanReport) -> Result<(), ScanError> {
        let date = report
            .as_of()
            .unwrap_or_else(|| Local::now().date_naive());
        let msg = format_message(report, date, self.suffix.as_deref());

        match &self.path {
            Some(path) => {
                fs::write(path, &msg)?;
                tracing::info!(path = %path.display(), "wrote scan message");
            }
            None => {
                let mut out = io::stdout().lock();
                out.write_all(msg.as_bytes())?;
                out.flush()?;
            }
        }
        Ok(())
    }
}
