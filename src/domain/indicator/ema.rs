//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warm-up gap: the first n-1 values are provisional but defined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: Vec::new(),
        };
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(bars.len());
    let mut ema = bars[0].close;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            ema = bar.close * k + ema * (1.0 - k);
        }
        values.push(IndicatorPoint::defined(bar.date, ema));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
