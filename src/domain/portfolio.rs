//! All-in/all-out portfolio state and the step-wise simulator.

use tracing::debug;

use super::error::EngineError;
use super::signal::TradeEvent;

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

/// Cash and units of the single instrument.
///
/// After every step at most one of the two is non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub units_held: f64,
}

impl PortfolioState {
    /// Mark-to-market value at `price`.
    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.units_held * price
    }

    pub fn is_long(&self) -> bool {
        self.units_held > 0.0
    }

    pub fn is_flat(&self) -> bool {
        self.units_held == 0.0
    }
}

/// Which branch a step took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Exited,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSimulator {
    initial_cash: f64,
    state: PortfolioState,
    history: Vec<f64>,
    trade_count: usize,
}

impl PortfolioSimulator {
    pub fn new(initial_cash: f64) -> Result<Self, EngineError> {
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(EngineError::invalid_config(
                "initial_cash",
                format!("initial_cash must be positive, got {initial_cash}"),
            ));
        }
        Ok(PortfolioSimulator {
            initial_cash,
            state: PortfolioState {
                cash: initial_cash,
                units_held: 0.0,
            },
            history: Vec::new(),
            trade_count: 0,
        })
    }

    /// Apply one bar's event at `price` and record the resulting equity.
    ///
    /// A non-positive or non-finite price fails with
    /// [`EngineError::InvalidPrice`] and leaves the state and history untouched.
    pub fn step(&mut self, price: f64, event: TradeEvent) -> Result<f64, EngineError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(EngineError::InvalidPrice { price });
        }

        match self.apply(price, event) {
            Transition::Entered => {
                self.trade_count += 1;
                debug!(price, units = self.state.units_held, "entered long");
            }
            Transition::Exited => {
                self.trade_count += 1;
                debug!(price, cash = self.state.cash, "exited to cash");
            }
            Transition::Unchanged if event != TradeEvent::Hold => {
                debug!(%event, price, "redundant signal ignored");
            }
            Transition::Unchanged => {}
        }

        debug_assert!(self.state.cash == 0.0 || self.state.units_held == 0.0);

        let value = self.state.value(price);
        self.history.push(value);
        Ok(value)
    }

    fn apply(&mut self, price: f64, event: TradeEvent) -> Transition {
        match event {
            TradeEvent::Enter if self.state.is_flat() => {
                self.state.units_held = self.state.cash / price;
                self.state.cash = 0.0;
                Transition::Entered
            }
            TradeEvent::Exit if self.state.is_long() => {
                self.state.cash = self.state.units_held * price;
                self.state.units_held = 0.0;
                Transition::Exited
            }
            _ => Transition::Unchanged,
        }
    }

    pub fn state(&self) -> PortfolioState {
        self.state
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// Equity after each successful step, in call order.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Number of Enter and Exit transitions actually taken.
    pub fn trade_count(&self) -> usize {
        self.trade_count
    }

    pub fn into_history(self) -> Vec<f64> {
        self.history
    }
}
