//! Configuration validation.
//!
//! Checks the effective settings, after file values and flag overrides are
//! merged, before any data is fetched.

use chrono::NaiveDate;

use crate::domain::error::EngineError;

pub const DATA_SOURCES: &[&str] = &["yahoo", "csv"];

pub fn validate_instrument(instrument: &str) -> Result<(), EngineError> {
    if instrument.trim().is_empty() {
        return Err(EngineError::invalid_config(
            "instrument",
            "instrument must not be empty",
        ));
    }
    Ok(())
}

pub fn validate_windows(short: i64, long: i64) -> Result<(), EngineError> {
    if short <= 0 {
        return Err(EngineError::invalid_config(
            "short_window",
            "short_window must be a positive integer",
        ));
    }
    if long <= 0 {
        return Err(EngineError::invalid_config(
            "long_window",
            "long_window must be a positive integer",
        ));
    }
    if short >= long {
        return Err(EngineError::invalid_config(
            "short_window",
            format!("short_window ({short}) must be less than long_window ({long})"),
        ));
    }
    Ok(())
}

pub fn validate_initial_cash(value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::invalid_config(
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

pub fn validate_risk_free_rate(value: f64) -> Result<(), EngineError> {
    if !(0.0..1.0).contains(&value) {
        return Err(EngineError::invalid_config(
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), EngineError> {
    if start > end {
        return Err(EngineError::invalid_config(
            "start_date",
            format!("start_date ({start}) must not be after end_date ({end})"),
        ));
    }
    Ok(())
}

pub fn validate_source(source: &str) -> Result<(), EngineError> {
    if !DATA_SOURCES.contains(&source) {
        return Err(EngineError::invalid_config(
            "source",
            format!("unknown data source {source:?} (expected one of: yahoo, csv)"),
        ));
    }
    Ok(())
}

pub fn validate_timeout(secs: i64) -> Result<(), EngineError> {
    if secs <= 0 {
        return Err(EngineError::invalid_config(
            "timeout_secs",
            "timeout_secs must be positive",
        ));
    }
    Ok(())
}
