//! Result delivery port trait.

use crate::domain::error::ScanError;
use crate::domain::scan::ScanReport;

/// Consumes the ranked scan output. Formatting, transport and persistence
/// live behind this trait; an empty result list is still delivered.
pub trait ResultSink {
    fn deliver(&self, report: &ScanReport) -> Result<(), ScanError>;
}
