//! Symbol universe: code-list parsing and shaping.
//!
//! The universe is opaque input to the scan; this module only normalises it
//! (trim, uppercase, de-duplicate, optional exchange suffix, optional limit).

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub codes: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("symbol list {path} has no {column} column")]
    MissingColumn { path: String, column: String },

    #[error("failed to read symbol list {path}: {reason}")]
    Read { path: String, reason: String },
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Append `suffix` (e.g. `.NS`) to codes that do not already carry it,
/// then keep at most `limit` codes in their original order.
pub fn shape_universe(codes: Vec<String>, suffix: Option<&str>, limit: Option<usize>) -> Universe {
    let suffix = suffix.map(str::trim).filter(|s| !s.is_empty());
    let mut codes: Vec<String> = codes
        .into_iter()
        .map(|code| match suffix {
            Some(sfx) if !code.ends_with(sfx) => format!("{code}{sfx}"),
            _ => code,
        })
        .collect();

    if let Some(limit) = limit {
        codes.truncate(limit);
    }

    Universe { codes }
}

/// Drop the exchange suffix for display, e.g. `RELIANCE.NS` -> `RELIANCE`.
pub fn display_code<'a>(code: &'a str, suffix: Option<&str>) -> &'a str {
    match suffix {
        Some(sfx) if !sfx.is_empty() => code.strip_suffix(sfx).unwrap_or(code),
        _ => code,
    }
}
