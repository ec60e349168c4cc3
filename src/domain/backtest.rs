//! Backtest driver and equity curve.
//!
//! [`Backtester`] fetches a price series, derives trade events from it and
//! steps a [`PortfolioSimulator`] through every bar in date order. Any failure
//! aborts the run; a returned curve always has one point per price.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::EngineError;
use super::portfolio::{DEFAULT_INITIAL_CASH, PortfolioSimulator, PortfolioState};
use super::price::PriceSeries;
use super::signal::{TradeEvent, TradeSeries};
use crate::ports::price_port::PriceSource;
use crate::ports::strategy_port::SignalStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn new(points: Vec<EquityPoint>) -> Self {
        EquityCurve { points }
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EquityPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }

    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.equity)
    }

    /// The last `n` points, or all of them if there are fewer.
    pub fn tail(&self, n: usize) -> &[EquityPoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }
}

impl<'a> IntoIterator for &'a EquityCurve {
    type Item = &'a EquityPoint;
    type IntoIter = std::slice::Iter<'a, EquityPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub initial_cash: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub instrument: String,
    pub initial_cash: f64,
    pub equity_curve: EquityCurve,
    pub final_state: PortfolioState,
    pub trade_count: usize,
}

/// Step a fresh simulator through `prices`, taking each bar's event from
/// `trades`. Bars with no matching event hold.
pub fn simulate(
    prices: &PriceSeries,
    trades: &TradeSeries,
    initial_cash: f64,
) -> Result<BacktestResult, EngineError> {
    let mut simulator = PortfolioSimulator::new(initial_cash)?;
    let mut points = Vec::with_capacity(prices.len());

    for point in prices {
        let event = trades.event_at(point.date).unwrap_or_else(|| {
            debug!(date = %point.date, "no signal for bar, holding");
            TradeEvent::Hold
        });

        let equity = simulator.step(point.close, event).inspect_err(|e| {
            debug!(date = %point.date, error = %e, "simulation step failed");
        })?;

        points.push(EquityPoint {
            date: point.date,
            equity,
        });
    }

    Ok(BacktestResult {
        instrument: prices.instrument().to_string(),
        initial_cash,
        equity_curve: EquityCurve::new(points),
        final_state: simulator.state(),
        trade_count: simulator.trade_count(),
    })
}

pub struct Backtester<'a> {
    source: &'a dyn PriceSource,
    strategy: &'a dyn SignalStrategy,
    config: SimulationConfig,
}

impl<'a> Backtester<'a> {
    /// Fails with [`EngineError::InvalidConfiguration`] for a non-positive
    /// initial cash balance, before anything is fetched.
    pub fn new(
        source: &'a dyn PriceSource,
        strategy: &'a dyn SignalStrategy,
        config: SimulationConfig,
    ) -> Result<Self, EngineError> {
        PortfolioSimulator::new(config.initial_cash)?;
        Ok(Backtester {
            source,
            strategy,
            config,
        })
    }

    pub fn config(&self) -> SimulationConfig {
        self.config
    }

    pub fn run(
        &self,
        instrument: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<EquityCurve, EngineError> {
        self.run_detailed(instrument, start_date, end_date)
            .map(|result| result.equity_curve)
    }

    pub fn run_detailed(
        &self,
        instrument: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BacktestResult, EngineError> {
        info!(instrument, %start_date, %end_date, "fetching prices");
        let prices = self.source.fetch(instrument, start_date, end_date)?;
        info!(
            instrument,
            bars = prices.len(),
            first = %prices.first_date(),
            last = %prices.last_date(),
            "prices loaded"
        );

        let trades = self.strategy.generate_signals(&prices);
        info!(
            strategy = %self.strategy.describe(),
            entries = trades.count(TradeEvent::Enter),
            exits = trades.count(TradeEvent::Exit),
            "signals generated"
        );

        let result = simulate(&prices, &trades, self.config.initial_cash)?;
        info!(
            instrument,
            steps = result.equity_curve.len(),
            trades = result.trade_count,
            final_equity = result.equity_curve.final_value().unwrap_or(result.initial_cash),
            "backtest complete"
        );
        Ok(result)
    }
}
