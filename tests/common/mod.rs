#![allow(dead_code)]

use chrono::NaiveDate;
use quant_engine::domain::error::EngineError;
use quant_engine::domain::price::{PricePoint, PriceSeries};
use quant_engine::domain::signal::{TradeEvent, TradeSeries, TradeSignal};
use quant_engine::ports::price_port::PriceSource;
use quant_engine::ports::strategy_port::SignalStrategy;
use std::cell::Cell;
use std::collections::HashMap;

/// In-memory price source that records how often it was asked for data.
pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_points(mut self, instrument: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(instrument.to_string(), points);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch(
        &self,
        instrument: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, EngineError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(instrument) {
            return Err(EngineError::data_unavailable(instrument, reason.clone()));
        }
        let points: Vec<PricePoint> = self
            .data
            .get(instrument)
            .map(|pts| {
                pts.iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::new(instrument, points)
    }
}

/// Strategy that replays a fixed event list, one per bar.
pub struct ScriptedStrategy {
    pub events: Vec<TradeEvent>,
}

impl SignalStrategy for ScriptedStrategy {
    fn generate_signals(&self, prices: &PriceSeries) -> TradeSeries {
        prices
            .iter()
            .zip(self.events.iter().chain(std::iter::repeat(&TradeEvent::Hold)))
            .map(|(p, &event)| TradeSignal {
                date: p.date,
                event,
            })
            .collect()
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily points starting at `start`.
pub fn make_points(start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            close,
        })
        .collect()
}

pub fn make_series(instrument: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(instrument, make_points(date(2024, 1, 1), closes)).unwrap()
}

/// Rise, fall, rise again: produces at least one full crossover cycle for
/// short windows.
pub fn zigzag_closes(leg: usize) -> Vec<f64> {
    let mut closes = Vec::with_capacity(leg * 3);
    for i in 0..leg {
        closes.push(100.0 + i as f64);
    }
    for i in 0..leg {
        closes.push(100.0 + leg as f64 - 2.0 * i as f64);
    }
    for i in 0..leg {
        closes.push(100.0 - leg as f64 + 3.0 * i as f64);
    }
    closes
}
