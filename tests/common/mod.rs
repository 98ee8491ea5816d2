#![allow(dead_code)]

use breakscan::domain::error::ScanError;
pub use breakscan::domain::ohlcv::OhlcvBar;
use breakscan::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub delay: Option<Duration>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            delay: None,
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, code: &str, history: usize) -> Result<Vec<OhlcvBar>, ScanError> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if let Some(reason) = self.errors.get(code) {
            return Err(ScanError::DataUnavailable {
                code: code.to_string(),
                reason: reason.clone(),
            });
        }
        match self.data.get(code) {
            Some(bars) => {
                let skip = bars.len().saturating_sub(history);
                Ok(bars[skip..].to_vec())
            }
            None => Err(ScanError::DataUnavailable {
                code: code.to_string(),
                reason: "unknown symbol".into(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        let mut codes: Vec<String> = self.data.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn make_bar(code: &str, day: usize, close: f64, volume: i64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        date: start_date() + chrono::Duration::days(day as i64),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume,
    }
}

/// 79 bars of a steady up-trend (+1, +1, -0.5 repeating from 100) at 200k
/// volume, then today's bar `today_delta` above yesterday at `today_volume`.
///
/// Daily and weekly resistance both end up at 140.0.
pub fn trend_series(code: &str, today_delta: f64, today_volume: i64) -> Vec<OhlcvBar> {
    let mut bars = Vec::with_capacity(80);
    let mut close = 100.0;
    for i in 0..79 {
        if i > 0 {
            close += if i % 3 != 0 { 1.0 } else { -0.5 };
        }
        bars.push(make_bar(code, i, close, 200_000));
    }
    bars.push(make_bar(code, 79, close + today_delta, today_volume));
    bars
}

/// Close 141, high 141.5, 2x average volume.
pub fn breakout_series(code: &str) -> Vec<OhlcvBar> {
    trend_series(code, 2.0, 400_000)
}

/// Close 139.2, just under resistance, average volume.
pub fn near_series(code: &str) -> Vec<OhlcvBar> {
    trend_series(code, 0.2, 200_000)
}

pub fn flat_series(code: &str, len: usize) -> Vec<OhlcvBar> {
    (0..len).map(|i| make_bar(code, i, 100.0, 200_000)).collect()
}

pub fn write_bars_csv(dir: &Path, code: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    fs::write(dir.join(format!("{code}.csv")), content).unwrap();
}
