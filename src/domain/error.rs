//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for breakscan.
///
/// Per-symbol variants (`DataUnavailable`, `InsufficientHistory`) are
/// recoverable: the scan orchestrator turns them into skips and carries on.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("data unavailable for {code}: {reason}")]
    DataUnavailable { code: String, reason: String },

    #[error("insufficient history for {code}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("export failed: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ScanError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ScanError> for std::process::ExitCode {
    fn from(err: &ScanError) -> Self {
        let code: u8 = match err {
            ScanError::Io(_) | ScanError::Export { .. } => 1,
            ScanError::ConfigParse { .. }
            | ScanError::ConfigMissing { .. }
            | ScanError::ConfigInvalid { .. } => 2,
            ScanError::Universe(_) => 3,
            ScanError::DataUnavailable { .. } | ScanError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
