//! Entry, stop, target and size for a classified symbol.
//!
//! - Confirmed: entry anchors on today's high plus `entry_buffer`.
//! - Near: entry anchors on daily resistance plus `entry_buffer`, as a
//!   conditional order for when resistance gives way.
//! - stop = entry - ATR * `atr_multiplier`, target = entry + risk * `reward_ratio`,
//!   quantity = floor(`risk_budget` / risk).
//!
//! All arithmetic is on unrounded values; [`TradePlan::rounded`] is applied once
//! at output. A plan whose risk is not strictly positive (zero or undefined ATR)
//! is not produced, and callers drop a rounded plan that fails
//! [`TradePlan::has_positive_risk`].

use crate::domain::classifier::{Classification, SignalInput};
use crate::domain::config::ScanConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePlan {
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub quantity: u64,
    pub risk_per_unit: f64,
}

impl TradePlan {
    pub fn rounded(&self) -> TradePlan {
        TradePlan {
            entry_price: round2(self.entry_price),
            stop_loss: round2(self.stop_loss),
            target: round2(self.target),
            quantity: self.quantity,
            risk_per_unit: round2(self.risk_per_unit),
        }
    }

    /// False once rounding has collapsed the stop onto the entry.
    pub fn has_positive_risk(&self) -> bool {
        self.risk_per_unit > 0.0 && self.stop_loss < self.entry_price
    }
}

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn entry_anchor(classification: Classification, input: &SignalInput) -> Option<f64> {
    match classification {
        Classification::ConfirmedBreakout => Some(input.high),
        Classification::NearBreakout => Some(input.baseline.daily_resistance),
        Classification::NoSignal => None,
    }
}

pub fn derive_trade_plan(
    classification: Classification,
    input: &SignalInput,
    atr: Option<f64>,
    config: &ScanConfig,
) -> Option<TradePlan> {
    let anchor = entry_anchor(classification, input)?;
    let atr = atr?;

    let entry_price = anchor * (1.0 + config.entry_buffer);
    let stop_loss = entry_price - atr * config.atr_multiplier;
    let risk_per_unit = entry_price - stop_loss;
    if !risk_per_unit.is_finite() || risk_per_unit <= 0.0 {
        return None;
    }

    let target = entry_price + risk_per_unit * config.reward_ratio;
    let quantity = (config.risk_budget / risk_per_unit).floor().max(0.0) as u64;

    Some(TradePlan {
        entry_price,
        stop_loss,
        target,
        quantity,
        risk_per_unit,
    })
}
