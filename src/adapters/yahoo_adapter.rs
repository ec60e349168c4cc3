//! Yahoo Finance price adapter.
//!
//! Fetches daily bars from Yahoo's v8 chart API and keeps one close per
//! trading day, preferring the adjusted close. Yahoo has no official API and
//! changes its format without notice; every failure surfaces as
//! [`EngineError::DataUnavailable`] so the CSV adapter can be used instead.

use crate::domain::error::EngineError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<Meta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Exchange metadata; `gmtoffset` is the exchange's UTC offset in seconds.
#[derive(Debug, Deserialize)]
struct Meta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| EngineError::invalid_config("timeout_secs", e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive on Yahoo's side; the day after `end` keeps it inclusive.
        let end_ts = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "{}/{instrument}?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true",
            self.base_url
        )
    }
}

/// Parse a chart API body into a price series restricted to `[start, end]`.
pub fn parse_chart_response(
    instrument: &str,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, EngineError> {
    let unavailable = |reason: String| EngineError::data_unavailable(instrument, reason);

    let resp: ChartResponse =
        serde_json::from_str(body).map_err(|e| unavailable(format!("unexpected response: {e}")))?;

    let data = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) => {
            return Err(unavailable(format!("{}: {}", err.code, err.description)));
        }
        (Some(results), None) => results
            .into_iter()
            .next()
            .ok_or_else(|| unavailable("result array is empty".into()))?,
        (None, None) => return Err(unavailable("empty result with no error".into())),
    };

    // Bars are stamped at the session open in UTC; the trading day is the
    // exchange-local date.
    let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = data.timestamp.unwrap_or_default();
    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();
    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = ts
            .checked_add(gmtoffset)
            .and_then(|local| chrono::DateTime::from_timestamp(local, 0))
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| unavailable(format!("invalid timestamp: {ts}")))?;

        if date < start || date > end {
            continue;
        }

        let adj = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());
        let close = closes.get(i).copied().flatten();

        // Null bars are non-trading days.
        if let Some(close) = adj.or(close) {
            points.push(PricePoint { date, close });
        }
    }

    points.sort_by_key(|p| p.date);
    let before = points.len();
    points.dedup_by_key(|p| p.date);
    if points.len() != before {
        warn!(instrument, dropped = before - points.len(), "duplicate bars dropped");
    }

    PriceSeries::new(instrument, points)
}

impl PriceSource for YahooAdapter {
    fn fetch(
        &self,
        instrument: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, EngineError> {
        let url = self.chart_url(instrument, start_date, end_date);
        debug!(%url, "requesting chart");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| EngineError::data_unavailable(instrument, format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| EngineError::data_unavailable(instrument, format!("read failed: {e}")))?;

        // Yahoo reports unknown symbols as 404 with a JSON error body.
        if !status.is_success() && !body.trim_start().starts_with('{') {
            return Err(EngineError::data_unavailable(
                instrument,
                format!("HTTP {status}"),
            ));
        }

        parse_chart_response(instrument, &body, start_date, end_date)
    }
}
