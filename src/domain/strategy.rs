//! Moving-average crossover strategy.
//!
//! The position is long while SMA(short) is strictly above SMA(long) and flat
//! otherwise, including every bar where either average is still warming up.
//! Events are the bar-to-bar change in that position; the first bar always
//! holds.

use crate::domain::error::EngineError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::price::PriceSeries;
use crate::domain::signal::{TradeEvent, TradeSeries, TradeSignal};
use crate::ports::strategy_port::SignalStrategy;

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageCross {
    short_window: usize,
    long_window: usize,
}

impl MovingAverageCross {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, EngineError> {
        if short_window == 0 {
            return Err(EngineError::invalid_config(
                "short_window",
                "short_window must be positive",
            ));
        }
        if short_window >= long_window {
            return Err(EngineError::invalid_config(
                "short_window",
                format!(
                    "short_window ({short_window}) must be less than long_window ({long_window})"
                ),
            ));
        }
        Ok(MovingAverageCross {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    /// 0/1 position per bar.
    pub fn positions(&self, prices: &PriceSeries) -> Vec<i8> {
        let short = calculate_sma(prices.points(), self.short_window);
        let long = calculate_sma(prices.points(), self.long_window);

        short
            .iter()
            .zip(&long)
            .map(|(s, l)| match (s.get(), l.get()) {
                (Some(s), Some(l)) if s > l => 1,
                _ => 0,
            })
            .collect()
    }
}

impl Default for MovingAverageCross {
    fn default() -> Self {
        MovingAverageCross {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

impl SignalStrategy for MovingAverageCross {
    fn generate_signals(&self, prices: &PriceSeries) -> TradeSeries {
        let positions = self.positions(prices);

        prices
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let event = if i == 0 {
                    TradeEvent::Hold
                } else {
                    TradeEvent::from_position_change(positions[i] - positions[i - 1])
                };
                TradeSignal {
                    date: point.date,
                    event,
                }
            })
            .collect()
    }

    fn describe(&self) -> String {
        format!("SMA({}/{}) crossover", self.short_window, self.long_window)
    }
}
