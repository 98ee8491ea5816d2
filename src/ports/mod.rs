//! Port traits: the seams between the scan core and its collaborators.

pub mod config_port;
pub mod data_port;
pub mod result_sink;
pub mod symbol_source;
