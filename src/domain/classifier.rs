//! Breakout classification.
//!
//! # Evaluation Semantics
//!
//! - Eligibility gate first: close >= `min_price` and avg volume >= `min_avg_volume`.
//!   A symbol failing the gate is `NoSignal` and no rule is evaluated.
//! - Rules in [`RULES`] are evaluated in order; the first match wins.
//! - `ConfirmedBreakout` precedes `NearBreakout`, and the near rule requires
//!   close strictly below daily resistance, so a symbol is never both.
//! - Close exactly at daily resistance satisfies neither rule.

use std::fmt;

use crate::domain::baseline::Baseline;
use crate::domain::config::ScanConfig;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    NoSignal,
    NearBreakout,
    ConfirmedBreakout,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::NoSignal => "None",
            Classification::NearBreakout => "Near Breakout",
            Classification::ConfirmedBreakout => "Confirmed Breakout",
        }
    }

    pub fn is_signal(&self) -> bool {
        !matches!(self, Classification::NoSignal)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the rules look at for one symbol on the scan date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInput {
    pub close: f64,
    pub high: f64,
    pub volume: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub rsi_prev: f64,
    pub baseline: Baseline,
}

impl SignalInput {
    /// Read today's and yesterday's values. `None` if any needed value is undefined.
    pub fn from_series(
        bars: &[OhlcvBar],
        frame: &IndicatorFrame,
        baseline: Baseline,
    ) -> Option<Self> {
        let today = bars.len().checked_sub(1)?;
        let yesterday = today.checked_sub(1)?;
        let bar = &bars[today];
        let now = frame.at(today);

        Some(Self {
            close: bar.close,
            high: bar.high,
            volume: bar.volume as f64,
            ema_fast: now.ema_fast?,
            ema_slow: now.ema_slow?,
            rsi: now.rsi?,
            rsi_prev: frame.rsi.value_at(yesterday)?,
            baseline,
        })
    }

    /// Today's volume over average volume.
    pub fn volume_multiple(&self) -> f64 {
        if self.baseline.avg_volume > 0.0 {
            self.volume / self.baseline.avg_volume
        } else {
            0.0
        }
    }

    fn trend_aligned(&self) -> bool {
        self.close > self.ema_fast && self.ema_fast > self.ema_slow
    }
}

pub type Predicate = fn(&SignalInput, &ScanConfig) -> bool;

#[derive(Clone, Copy)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub classification: Classification,
    pub predicate: Predicate,
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("name", &self.name)
            .field("classification", &self.classification)
            .finish()
    }
}

pub const RULES: [ClassificationRule; 2] = [
    ClassificationRule {
        name: "confirmed_breakout",
        classification: Classification::ConfirmedBreakout,
        predicate: confirmed_breakout,
    },
    ClassificationRule {
        name: "near_breakout",
        classification: Classification::NearBreakout,
        predicate: near_breakout,
    },
];

pub fn is_eligible(input: &SignalInput, config: &ScanConfig) -> bool {
    input.close >= config.min_price && input.baseline.avg_volume >= config.min_avg_volume
}

pub fn confirmed_breakout(input: &SignalInput, config: &ScanConfig) -> bool {
    let daily = input.baseline.daily_resistance;
    let extension = (input.close - daily) / daily;

    input.close > daily
        && input.close > input.baseline.weekly_resistance
        && input.trend_aligned()
        && input.rsi > config.confirmed_rsi_floor
        && input.rsi > input.rsi_prev
        && input.volume >= input.baseline.avg_volume * config.volume_multiplier
        && extension <= config.max_extension
}

pub fn near_breakout(input: &SignalInput, config: &ScanConfig) -> bool {
    let daily = input.baseline.daily_resistance;

    input.close >= daily * config.near_breakout_threshold
        && input.close < daily
        && input.trend_aligned()
        && input.rsi > config.near_rsi_floor
        && input.volume >= input.baseline.avg_volume * config.near_volume_multiplier
}

pub fn classify_with(
    rules: &[ClassificationRule],
    input: &SignalInput,
    config: &ScanConfig,
) -> Classification {
    if !is_eligible(input, config) {
        return Classification::NoSignal;
    }
    rules
        .iter()
        .find(|rule| (rule.predicate)(input, config))
        .map(|rule| rule.classification)
        .unwrap_or(Classification::NoSignal)
}

pub fn classify(input: &SignalInput, config: &ScanConfig) -> Classification {
    classify_with(&RULES, input, config)
}
