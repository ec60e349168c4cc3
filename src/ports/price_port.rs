//! Price data port trait.

use crate::domain::error::EngineError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

/// A source of historical close prices.
///
/// The date range is inclusive on both ends for every implementation. A
/// source that finds no observations fails with
/// [`EngineError::DataUnavailable`] rather than returning an empty series.
pub trait PriceSource {
    fn fetch(
        &self,
        instrument: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, EngineError>;
}
