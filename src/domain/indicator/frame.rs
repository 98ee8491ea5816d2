//! Indicator frame: every series the classifier reads, aligned 1:1 with the bars.

use crate::domain::config::IndicatorSettings;
use crate::domain::error::ScanError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub ema_fast: IndicatorSeries,
    pub ema_slow: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub atr: IndicatorSeries,
}

/// Indicator values at one bar. `None` where a series is still warming up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.ema_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_fast.is_empty()
    }

    pub fn at(&self, index: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema_fast: self.ema_fast.value_at(index),
            ema_slow: self.ema_slow.value_at(index),
            rsi: self.rsi.value_at(index),
            atr: self.atr.value_at(index),
        }
    }
}

/// Compute all indicators for a chronological series.
pub fn compute_frame(
    bars: &[OhlcvBar],
    settings: &IndicatorSettings,
) -> Result<IndicatorFrame, ScanError> {
    let minimum = settings.required_bars();
    if bars.len() < minimum {
        return Err(ScanError::InsufficientHistory {
            code: bars.first().map(|b| b.code.clone()).unwrap_or_default(),
            bars: bars.len(),
            minimum,
        });
    }

    Ok(IndicatorFrame {
        ema_fast: calculate_ema(bars, settings.ema_fast),
        ema_slow: calculate_ema(bars, settings.ema_slow),
        rsi: calculate_rsi(bars, settings.rsi_period),
        atr: calculate_atr(bars, settings.atr_period),
    })
}
