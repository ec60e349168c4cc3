//! Capability traits the domain depends on.

pub mod config_port;
pub mod price_port;
pub mod report_port;
pub mod strategy_port;
