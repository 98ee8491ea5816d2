//! Symbol universe port trait.

use crate::domain::error::ScanError;

pub trait SymbolSource {
    /// Ordered symbol identifiers to scan.
    fn symbols(&self) -> Result<Vec<String>, ScanError>;
}
