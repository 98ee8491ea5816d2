//! Trailing resistance and volume baselines.
//!
//! Every window ends at the bar before today. Today's bar is never part of the
//! baseline it is compared against.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// Highest high over the daily lookback.
    pub daily_resistance: f64,
    /// Highest high over the weekly lookback.
    pub weekly_resistance: f64,
    /// Mean volume over the daily lookback.
    pub avg_volume: f64,
}

/// The `lookback` bars immediately preceding the last bar.
pub fn trailing_window(bars: &[OhlcvBar], lookback: usize) -> Option<&[OhlcvBar]> {
    let today = bars.len().checked_sub(1)?;
    if lookback == 0 || today < lookback {
        return None;
    }
    Some(&bars[today - lookback..today])
}

pub fn resistance(bars: &[OhlcvBar], lookback: usize) -> Option<f64> {
    trailing_window(bars, lookback)
        .map(|w| w.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max))
}

pub fn average_volume(bars: &[OhlcvBar], lookback: usize) -> Option<f64> {
    trailing_window(bars, lookback)
        .map(|w| w.iter().map(|b| b.volume as f64).sum::<f64>() / lookback as f64)
}

pub fn compute_baseline(
    bars: &[OhlcvBar],
    lookback: usize,
    week_lookback: usize,
) -> Result<Baseline, ScanError> {
    let insufficient = || ScanError::InsufficientHistory {
        code: bars.first().map(|b| b.code.clone()).unwrap_or_default(),
        bars: bars.len(),
        minimum: lookback.max(week_lookback) + 1,
    };

    Ok(Baseline {
        daily_resistance: resistance(bars, lookback).ok_or_else(insufficient)?,
        weekly_resistance: resistance(bars, week_lookback).ok_or_else(insufficient)?,
        avg_volume: average_volume(bars, lookback).ok_or_else(insufficient)?,
    })
}
