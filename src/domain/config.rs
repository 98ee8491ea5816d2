//! Screening thresholds and indicator settings.
//!
//! `ScanConfig` is built once per run (defaults, then INI overrides, then CLI
//! overrides) and passed by reference through the whole pipeline.

/// Indicator periods used by the indicator frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSettings {
    /// Fast EMA period; the close must sit above it.
    pub ema_fast: usize,
    /// Slow EMA period; the fast EMA must sit above it.
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_slow: 50,
            rsi_period: 14,
            atr_period: 14,
        }
    }
}

impl IndicatorSettings {
    /// Bars needed so every indicator has a value today, and RSI has one yesterday.
    pub fn required_bars(&self) -> usize {
        self.ema_fast
            .max(self.ema_slow)
            .max(self.rsi_period + 2)
            .max(self.atr_period)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Bars before today used for daily resistance and average volume.
    pub lookback_days: usize,
    /// Bars before today used for weekly resistance.
    pub week_lookback_days: usize,
    /// Confirmed breakout needs today's volume >= avg volume * this.
    pub volume_multiplier: f64,
    /// Near breakout needs close >= daily resistance * this.
    pub near_breakout_threshold: f64,
    /// Largest allowed (close - resistance) / resistance for a confirmed breakout.
    pub max_extension: f64,
    /// Stop distance in ATRs below entry.
    pub atr_multiplier: f64,
    /// Target distance as a multiple of per-unit risk.
    pub reward_ratio: f64,
    /// Money at risk per trade; quantity = floor(risk_budget / risk).
    pub risk_budget: f64,
    /// Eligibility floor on today's close.
    pub min_price: f64,
    /// Eligibility floor on average volume.
    pub min_avg_volume: f64,
    /// Symbols with fewer bars are skipped before any computation.
    pub min_history: usize,
    /// Bars requested from the data provider.
    pub history_days: usize,
    /// Entry sits this fraction above the trigger level.
    pub entry_buffer: f64,
    pub confirmed_rsi_floor: f64,
    pub near_rsi_floor: f64,
    pub near_volume_multiplier: f64,
    pub indicators: IndicatorSettings,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_days: 20,
            week_lookback_days: 25,
            volume_multiplier: 1.05,
            near_breakout_threshold: 0.95,
            max_extension: 0.05,
            atr_multiplier: 1.2,
            reward_ratio: 2.0,
            risk_budget: 1000.0,
            min_price: 20.0,
            min_avg_volume: 100_000.0,
            min_history: 60,
            history_days: 90,
            entry_buffer: 0.002,
            confirmed_rsi_floor: 45.0,
            near_rsi_floor: 40.0,
            near_volume_multiplier: 0.8,
            indicators: IndicatorSettings::default(),
        }
    }
}

impl ScanConfig {
    /// Smallest series the pipeline accepts for a symbol.
    pub fn required_history(&self) -> usize {
        self.min_history
            .max(self.indicators.required_bars())
            .max(self.lookback_days + 1)
            .max(self.week_lookback_days + 1)
    }
}
