//! Average True Range as a simple rolling mean of true range.
//!
//! The first bar has no previous close, so its true range is measured against
//! its own close and degenerates to high - low.
//!
//! The first defined value is at bar `period - 1`, the window that still
//! includes bar 0 (pandas `rolling(period).mean()` over true range).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values: bars.iter().map(|b| IndicatorPoint::undefined(b.date)).collect(),
        };
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = if i == 0 { bar.close } else { bars[i - 1].close };
            bar.true_range(prev_close)
        })
        .collect();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i + 1 < period {
                IndicatorPoint::undefined(bar.date)
            } else {
                let window = &tr_values[i + 1 - period..=i];
                IndicatorPoint::defined(bar.date, window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
