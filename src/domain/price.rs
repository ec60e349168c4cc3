//! Close-price series for a single instrument.

use chrono::NaiveDate;

use super::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint { date, close }
    }
}

/// Time-ordered close prices for one instrument over one queried range.
///
/// Always non-empty with strictly increasing dates. Prices themselves are not
/// checked here: a non-positive close is rejected by the simulator when it is
/// stepped over.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    instrument: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(instrument: &str, points: Vec<PricePoint>) -> Result<Self, EngineError> {
        if points.is_empty() {
            return Err(EngineError::data_unavailable(
                instrument,
                "source returned no observations",
            ));
        }

        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(EngineError::MalformedSeries {
                instrument: instrument.to_string(),
                reason: format!(
                    "dates must be strictly increasing: {} followed by {}",
                    pair[0].date, pair[1].date
                ),
            });
        }

        Ok(PriceSeries {
            instrument: instrument.to_string(),
            points,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A constructed series is never empty; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
