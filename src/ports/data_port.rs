//! Bar provider port trait.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// The most recent `history` daily bars for `code`, oldest-first.
    ///
    /// Any failure is reported as `ScanError::DataUnavailable`; the scan
    /// treats it as a skip for that symbol.
    fn fetch_bars(&self, code: &str, history: usize) -> Result<Vec<OhlcvBar>, ScanError>;

    fn list_symbols(&self) -> Result<Vec<String>, ScanError>;
}
