//! Configuration validation.
//!
//! Validates a built `ScanConfig` before any symbol is fetched.

use crate::domain::config::ScanConfig;
use crate::domain::error::ScanError;

pub fn validate_scan_config(config: &ScanConfig) -> Result<(), ScanError> {
    validate_lookbacks(config)?;
    validate_multipliers(config)?;
    validate_thresholds(config)?;
    validate_floors(config)?;
    validate_indicators(config)?;
    validate_history(config)?;
    Ok(())
}

fn validate_lookbacks(config: &ScanConfig) -> Result<(), ScanError> {
    if config.lookback_days == 0 {
        return Err(ScanError::invalid(
            "scan",
            "lookback_days",
            "lookback_days must be at least 1",
        ));
    }
    if config.week_lookback_days == 0 {
        return Err(ScanError::invalid(
            "scan",
            "week_lookback_days",
            "week_lookback_days must be at least 1",
        ));
    }
    Ok(())
}

fn positive(value: f64, key: &str) -> Result<(), ScanError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ScanError::invalid(
            "scan",
            key,
            format!("{key} must be positive"),
        ));
    }
    Ok(())
}

fn non_negative(value: f64, key: &str) -> Result<(), ScanError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScanError::invalid(
            "scan",
            key,
            format!("{key} must be non-negative"),
        ));
    }
    Ok(())
}

fn validate_multipliers(config: &ScanConfig) -> Result<(), ScanError> {
    positive(config.volume_multiplier, "volume_multiplier")?;
    positive(config.near_volume_multiplier, "near_volume_multiplier")?;
    positive(config.atr_multiplier, "atr_multiplier")?;
    positive(config.reward_ratio, "reward_ratio")?;
    positive(config.risk_budget, "risk_budget")?;
    Ok(())
}

fn validate_thresholds(config: &ScanConfig) -> Result<(), ScanError> {
    let near = config.near_breakout_threshold;
    if !(near > 0.0 && near <= 1.0) {
        return Err(ScanError::invalid(
            "scan",
            "near_breakout_threshold",
            "near_breakout_threshold must be in (0, 1]",
        ));
    }
    non_negative(config.max_extension, "max_extension")?;
    non_negative(config.entry_buffer, "entry_buffer")?;

    for (key, value) in [
        ("confirmed_rsi_floor", config.confirmed_rsi_floor),
        ("near_rsi_floor", config.near_rsi_floor),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(ScanError::invalid(
                "scan",
                key,
                format!("{key} must be between 0 and 100"),
            ));
        }
    }
    Ok(())
}

fn validate_floors(config: &ScanConfig) -> Result<(), ScanError> {
    non_negative(config.min_price, "min_price")?;
    non_negative(config.min_avg_volume, "min_avg_volume")?;
    Ok(())
}

fn validate_indicators(config: &ScanConfig) -> Result<(), ScanError> {
    let ind = &config.indicators;
    for (key, value) in [
        ("ema_fast", ind.ema_fast),
        ("ema_slow", ind.ema_slow),
        ("rsi_period", ind.rsi_period),
        ("atr_period", ind.atr_period),
    ] {
        if value == 0 {
            return Err(ScanError::invalid(
                "indicators",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }
    if ind.ema_fast >= ind.ema_slow {
        return Err(ScanError::invalid(
            "indicators",
            "ema_fast",
            "ema_fast must be shorter than ema_slow",
        ));
    }
    Ok(())
}

fn validate_history(config: &ScanConfig) -> Result<(), ScanError> {
    let needed = config
        .indicators
        .required_bars()
        .max(config.lookback_days + 1)
        .max(config.week_lookback_days + 1);
    if config.min_history < needed {
        return Err(ScanError::invalid(
            "scan",
            "min_history",
            format!("min_history must be at least {needed} for the configured windows"),
        ));
    }
    if config.history_days < config.min_history {
        return Err(ScanError::invalid(
            "scan",
            "history_days",
            "history_days must not be shorter than min_history",
        ));
    }
    Ok(())
}
