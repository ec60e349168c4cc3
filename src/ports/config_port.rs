//! Configuration access port trait.
//!
//! Typed lookups return `Ok(None)` for an absent key and
//! [`EngineError::InvalidConfiguration`] for a value that is present but does
//! not parse. Callers apply their own defaults.

use chrono::NaiveDate;
use std::str::FromStr;

use crate::domain::error::EngineError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, EngineError> {
        parse_value(self.get_string(section, key), key, "an integer")
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, EngineError> {
        parse_value(self.get_string(section, key), key, "a number")
    }

    /// Parse a `YYYY-MM-DD` value.
    fn get_date(&self, section: &str, key: &str) -> Result<Option<NaiveDate>, EngineError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(Some)
                .map_err(|_| {
                    EngineError::invalid_config(
                        key,
                        format!("invalid date {raw:?} (expected YYYY-MM-DD)"),
                    )
                }),
        }
    }
}

fn parse_value<T: FromStr>(
    raw: Option<String>,
    key: &str,
    expected: &str,
) -> Result<Option<T>, EngineError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            EngineError::invalid_config(key, format!("invalid value {raw:?} (expected {expected})"))
        }),
    }
}
