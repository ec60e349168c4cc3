//! Simple Moving Average indicator.
//!
//! SMA(n) = (P[i-n+1] + ... + P[i]) / n
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::IndicatorPoint;
use crate::domain::price::PricePoint;

pub fn calculate_sma(points: &[PricePoint], period: usize) -> Vec<IndicatorPoint> {
    let mut values = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        let valid = period > 0 && i + 1 >= period;
        // Each window is summed afresh so equal windows compare exactly equal.
        let sma = if valid {
            points[i + 1 - period..=i].iter().map(|p| p.close).sum::<f64>() / period as f64
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: point.date,
            valid,
            value: sma,
        });
    }

    values
}
