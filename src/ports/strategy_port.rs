//! Signal strategy port trait.

use crate::domain::price::PriceSeries;
use crate::domain::signal::TradeSeries;

/// Turns a price series into trade events.
///
/// Implementations are pure: the returned series has exactly one signal per
/// input point, dated identically, and nothing is carried between calls.
pub trait SignalStrategy {
    fn generate_signals(&self, prices: &PriceSeries) -> TradeSeries;

    /// Human-readable name with parameters, e.g. `SMA(50/200) crossover`.
    fn describe(&self) -> String;
}
