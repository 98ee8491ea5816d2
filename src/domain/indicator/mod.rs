//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values aligned with its bars
//!
//! Warm-up points carry `valid == false` and a NaN value. Readers go through
//! [`IndicatorSeries::value_at`], which never hands out an undefined value.

pub mod atr;
pub mod ema;
pub mod frame;
pub mod rsi;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn defined(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }

    pub fn undefined(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: f64::NAN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Atr(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn last(&self) -> Option<f64> {
        self.values.len().checked_sub(1).and_then(|i| self.value_at(i))
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}
