//! Rolling indicators over a price series.
//!
//! Every calculator returns one [`IndicatorPoint`] per input bar. Bars before
//! the warm-up period completes are marked invalid rather than given a value.

pub mod sma;

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    /// The value, or `None` during warm-up.
    pub fn get(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}
