//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_export;
pub mod fallback_adapter;
pub mod file_config_adapter;
pub mod message_report;
pub mod universe_adapter;
