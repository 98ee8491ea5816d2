//! Symbol sources: an inline code list or an index constituent file.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::ScanError;
use crate::domain::universe::{parse_codes, UniverseError};
use crate::ports::data_port::DataPort;
use crate::ports::symbol_source::SymbolSource;

/// Comma-separated codes from config or the command line.
pub struct ConfiguredSymbols {
    codes: String,
}

impl ConfiguredSymbols {
    pub fn new(codes: impl Into<String>) -> Self {
        Self {
            codes: codes.into(),
        }
    }
}

impl SymbolSource for ConfiguredSymbols {
    fn symbols(&self) -> Result<Vec<String>, ScanError> {
        Ok(parse_codes(&self.codes)?)
    }
}

/// A CSV with a header row; codes are read from the named column.
pub struct SymbolListFile {
    path: PathBuf,
    column: String,
}

impl SymbolListFile {
    pub const DEFAULT_COLUMN: &'static str = "Symbol";

    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            column: Self::DEFAULT_COLUMN.to_string(),
        }
    }

    pub fn with_column(mut self, column: &str) -> Self {
        self.column = column.to_string();
        self
    }

    fn read_error(&self, reason: impl ToString) -> UniverseError {
        UniverseError::Read {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl SymbolSource for SymbolListFile {
    fn symbols(&self) -> Result<Vec<String>, ScanError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr.headers().map_err(|e| self.read_error(e))?;
        let index = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(&self.column))
            .ok_or_else(|| UniverseError::MissingColumn {
                path: self.path.display().to_string(),
                column: self.column.clone(),
            })?;

        let mut codes = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| self.read_error(e))?;
            match record.get(index).map(str::trim) {
                Some(code) if !code.is_empty() => {
                    let code = code.to_uppercase();
                    if !codes.contains(&code) {
                        codes.push(code);
                    }
                }
                _ => {}
            }
        }
        Ok(codes)
    }
}

/// Every symbol the data provider knows about.
pub struct ProviderSymbols<'a> {
    port: &'a dyn DataPort,
}

impl<'a> ProviderSymbols<'a> {
    pub fn new(port: &'a dyn DataPort) -> Self {
        Self { port }
    }
}

impl SymbolSource for ProviderSymbols<'_> {
    fn symbols(&self) -> Result<Vec<String>, ScanError> {
        self.port.list_symbols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn configured_symbols_parse() {
        let src = ConfiguredSymbols::new("tcs, INFY");
        assert_eq!(src.symbols().unwrap(), vec!["TCS", "INFY"]);
    }

    #[test]
    fn configured_symbols_reject_empty_token() {
        let err = ConfiguredSymbols::new("TCS,,INFY").symbols().unwrap_err();
        assert!(matches!(err, ScanError::Universe(UniverseError::EmptyToken)));
    }

    #[test]
    fn list_file_reads_symbol_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ind_nifty500list.csv");
        fs::write(
            &path,
            "Company Name,Industry,Symbol,Series\n\
             Reliance Industries,Oil,RELIANCE,EQ\n\
             Infosys,IT,INFY,EQ\n\
             Dup,IT,infy,EQ\n\
             Blank,IT,,EQ\n",
        )
        .unwrap();

        let codes = SymbolListFile::new(path).symbols().unwrap();
        assert_eq!(codes, vec!["RELIANCE", "INFY"]);
    }

    #[test]
    fn list_file_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.csv");
        fs::write(&path, "Code\nTCS\n").unwrap();

        let err = SymbolListFile::new(path).symbols().unwrap_err();
        assert!(matches!(
            err,
            ScanError::Universe(UniverseError::MissingColumn { ref column, .. }) if column == "Symbol"
        ));
    }

    #[test]
    fn list_file_custom_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.csv");
        fs::write(&path, "Code\nTCS\n").unwrap();

        let codes = SymbolListFile::new(path).with_column("Code").symbols().unwrap();
        assert_eq!(codes, vec!["TCS"]);
    }

    #[test]
    fn list_file_unreadable() {
        let err = SymbolListFile::new(PathBuf::from("/nonexistent/list.csv"))
            .symbols()
            .unwrap_err();
        assert!(matches!(err, ScanError::Universe(UniverseError::Read { .. })));
    }
}
