//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod baseline;
pub mod classifier;
pub mod trade_plan;
pub mod scan;
pub mod config;
pub mod config_validation;
pub mod universe;
pub mod error;
