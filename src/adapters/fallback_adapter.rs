//! Primary-then-offline data port.

use tracing::warn;

use crate::domain::error::ScanError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;

/// Tries `primary` first and serves from `fallback` when it fails.
pub struct FallbackDataPort<P, F> {
    primary: P,
    fallback: F,
}

impl<P: DataPort, F: DataPort> FallbackDataPort<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: DataPort, F: DataPort> DataPort for FallbackDataPort<P, F> {
    fn fetch_bars(&self, code: &str, history: usize) -> Result<Vec<OhlcvBar>, ScanError> {
        match self.primary.fetch_bars(code, history) {
            Ok(bars) if !bars.is_empty() => Ok(bars),
            Ok(_) => {
                warn!(code, "primary provider returned no bars, using offline data");
                self.fallback.fetch_bars(code, history)
            }
            Err(e) => {
                warn!(code, error = %e, "primary provider failed, using offline data");
                self.fallback.fetch_bars(code, history)
            }
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        self.primary
            .list_symbols()
            .or_else(|_| self.fallback.list_symbols())
    }
}
