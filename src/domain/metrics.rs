//! Performance metrics computed from an equity curve.

use super::backtest::{BacktestResult, EquityPoint};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub trade_count: usize,
}

impl Metrics {
    pub fn compute(result: &BacktestResult, risk_free_rate: f64) -> Self {
        let equity_curve = result.equity_curve.points();
        let initial_cash = result.initial_cash;

        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_cash);

        let total_return = if initial_cash > 0.0 {
            (final_equity - initial_cash) / initial_cash
        } else {
            0.0
        };

        let trading_days = equity_curve.len() as f64;
        let years = trading_days / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return.is_finite() {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);
        let sharpe_ratio = compute_sharpe(equity_curve, risk_free_rate / TRADING_DAYS_PER_YEAR);

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            trade_count: result.trade_count,
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the peak, and the longest
/// run of bars spent below a prior peak.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    if equity_curve.is_empty() {
        return (0.0, 0);
    }

    let mut peak = equity_curve[0].equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}

fn compute_sharpe(equity_curve: &[EquityPoint], daily_rf: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 { (curr - prev) / prev } else { 0.0 }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        ((mean - daily_rf) / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::EquityCurve;
    use crate::domain::portfolio::PortfolioState;
    use chrono::NaiveDate;

    fn make_result(values: &[f64], trade_count: usize) -> BacktestResult {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                equity: v,
            })
            .collect();
        BacktestResult {
            instrument: "TEST".into(),
            initial_cash: values.first().copied().unwrap_or(100_000.0),
            equity_curve: EquityCurve::new(points),
            final_state: PortfolioState {
                cash: 0.0,
                units_held: 0.0,
            },
            trade_count,
        }
    }

    #[test]
    fn total_return() {
        let m = Metrics::compute(&make_result(&[100.0, 105.0, 110.0], 2), 0.0);
        assert!((m.total_return - 0.10).abs() < 1e-10);
        assert_eq!(m.trade_count, 2);
    }

    #[test]
    fn empty_curve_is_all_zero() {
        let m = Metrics::compute(&make_result(&[], 0), 0.0);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.annualized_return, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.max_drawdown_duration, 0);
    }

    #[test]
    fn single_point_has_no_sharpe() {
        let m = Metrics::compute(&make_result(&[100.0], 0), 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.total_return, 0.0);
    }

    #[test]
    fn drawdown_depth_and_duration() {
        let m = Metrics::compute(&make_result(&[100.0, 120.0, 90.0, 96.0, 130.0, 117.0], 0), 0.0);
        // Peak 120 -> trough 90 = 25%, two bars under water.
        assert!((m.max_drawdown - 0.25).abs() < 1e-10);
        assert_eq!(m.max_drawdown_duration, 2);
    }

    #[test]
    fn flat_curve_has_zero_sharpe_and_drawdown() {
        let m = Metrics::compute(&make_result(&[100.0; 10], 0), 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
    }

    #[test]
    fn full_year_annualizes_to_total() {
        let mut values = vec![100.0; 252];
        values[251] = 110.0;
        let m = Metrics::compute(&make_result(&values, 0), 0.0);
        assert!((m.annualized_return - 0.10).abs() < 1e-10);
    }

    #[test]
    fn steady_growth_has_positive_sharpe() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 + (i % 2) as f64 * 0.5).collect();
        let m = Metrics::compute(&make_result(&values, 0), 0.0);
        assert!(m.sharpe_ratio > 0.0);
    }
}
