//! Discrete trade events and their time-aligned series.

use chrono::NaiveDate;
use std::fmt;

/// What the strategy asks the portfolio to do on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TradeEvent {
    /// Go fully long (+1).
    Enter,
    /// Liquidate to cash (-1).
    Exit,
    /// No action (0).
    #[default]
    Hold,
}

impl TradeEvent {
    /// Map the change in a 0/1 position state to an event.
    pub fn from_position_change(delta: i8) -> Self {
        match delta.signum() {
            1 => TradeEvent::Enter,
            -1 => TradeEvent::Exit,
            _ => TradeEvent::Hold,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            TradeEvent::Enter => 1,
            TradeEvent::Exit => -1,
            TradeEvent::Hold => 0,
        }
    }
}

impl fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeEvent::Enter => write!(f, "ENTER"),
            TradeEvent::Exit => write!(f, "EXIT"),
            TradeEvent::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeSignal {
    pub date: NaiveDate,
    pub event: TradeEvent,
}

/// Trade events sorted by date, one per bar of the series they were derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeSeries {
    signals: Vec<TradeSignal>,
}

impl TradeSeries {
    /// Signals are sorted by date on construction.
    pub fn new(mut signals: Vec<TradeSignal>) -> Self {
        signals.sort_by_key(|s| s.date);
        TradeSeries { signals }
    }

    /// Event recorded for `date`, if any.
    pub fn event_at(&self, date: NaiveDate) -> Option<TradeEvent> {
        self.signals
            .binary_search_by_key(&date, |s| s.date)
            .ok()
            .map(|i| self.signals[i].event)
    }

    pub fn signals(&self) -> &[TradeSignal] {
        &self.signals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TradeSignal> {
        self.signals.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn count(&self, event: TradeEvent) -> usize {
        self.signals.iter().filter(|s| s.event == event).count()
    }
}

impl FromIterator<TradeSignal> for TradeSeries {
    fn from_iter<I: IntoIterator<Item = TradeSignal>>(iter: I) -> Self {
        TradeSeries::new(iter.into_iter().collect())
    }
}
