//! Configuration access port trait.

use crate::domain::error::ScanError;

/// Sectioned key/value lookup. Blank strings read as absent. Numeric getters
/// return `default` for an absent key and `ConfigInvalid` for one that is
/// present but does not parse.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, ScanError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, ScanError>;
}
