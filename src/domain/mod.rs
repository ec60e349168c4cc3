//! Core domain types and logic.

pub mod price;
pub mod signal;
pub mod indicator;
pub mod strategy;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
