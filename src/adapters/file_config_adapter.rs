//! INI file configuration adapter.

use crate::domain::error::ScanError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| ScanError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, ScanError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ScanError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_number<T: std::str::FromStr>(
        &self,
        section: &str,
        key: &str,
        default: T,
        kind: &str,
    ) -> Result<T, ScanError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| {
                ScanError::invalid(section, key, format!("{key} must be {kind}, got {raw:?}"))
            }),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, ScanError> {
        self.parse_number(section, key, default, "an integer")
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, ScanError> {
        self.parse_number(section, key, default, "a number")
    }
}
