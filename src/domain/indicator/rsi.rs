//! RSI (Relative Strength Index) indicator implementation.
//!
//! Average gain and average loss are plain rolling means of the last n
//! close-to-close changes (not Wilder smoothing):
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes for a full window).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = Vec::with_capacity(bars.len());

    if period == 0 {
        values.extend(bars.iter().map(|b| IndicatorPoint::undefined(b.date)));
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    // changes[j] is the move into bar j + 1
    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

    for (i, bar) in bars.iter().enumerate() {
        if i < period {
            values.push(IndicatorPoint::undefined(bar.date));
            continue;
        }

        let window = &changes[i - period..i];
        let gain: f64 = window.iter().filter(|c| **c > 0.0).sum();
        let loss: f64 = window.iter().filter(|c| **c < 0.0).map(|c| -c).sum();
        let avg_gain = gain / period as f64;
        let avg_loss = loss / period as f64;

        values.push(IndicatorPoint::defined(bar.date, rsi_from_averages(avg_gain, avg_loss)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
