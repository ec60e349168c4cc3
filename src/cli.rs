//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestResult, Backtester, SimulationConfig};
use crate::domain::config_validation::{
    validate_date_range, validate_initial_cash, validate_instrument, validate_risk_free_rate,
    validate_source, validate_timeout, validate_windows,
};
use crate::domain::error::EngineError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::DEFAULT_INITIAL_CASH;
use crate::domain::strategy::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, MovingAverageCross};
use crate::ports::config_port::{ConfigPort, DATE_FORMAT};
use crate::ports::price_port::PriceSource;
use crate::ports::report_port::ReportPort;
use crate::ports::strategy_port::SignalStrategy;

pub const DEFAULT_INSTRUMENT: &str = "SPY";
pub const DEFAULT_START_DATE: &str = "2015-01-01";
pub const DEFAULT_END_DATE: &str = "2025-01-01";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

#[derive(Parser, Debug)]
#[command(name = "quant-engine", about = "Moving-average crossover backtester")]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest(BacktestArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Every flag overrides the matching config file value.
#[derive(Args, Debug, Clone, Default)]
pub struct BacktestArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub instrument: Option<String>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub short_window: Option<usize>,
    #[arg(long)]
    pub long_window: Option<usize>,
    #[arg(long)]
    pub initial_cash: Option<f64>,
    /// Price source: yahoo or csv
    #[arg(long)]
    pub source: Option<String>,
    /// Directory of <instrument>.csv files; implies --source csv
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,
    /// Write the equity curve as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Number of trailing equity points to print
    #[arg(long, default_value_t = 5)]
    pub tail: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSourceKind {
    Yahoo { timeout: Duration },
    Csv { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub instrument: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub short_window: usize,
    pub long_window: usize,
    pub initial_cash: f64,
    pub risk_free_rate: f64,
    pub source: DataSourceKind,
    pub output: Option<PathBuf>,
    pub tail: usize,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest(args) => run_backtest(&args).map(|summary| print!("{summary}")),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, EngineError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)
        }
        None => FileConfigAdapter::from_string(""),
    }
}

fn parse_default_date(key: &str, raw: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| EngineError::invalid_config(key, e.to_string()))
}

/// Merge flag overrides onto config file values, then validate the result.
pub fn build_settings(
    config: &dyn ConfigPort,
    args: &BacktestArgs,
) -> Result<BacktestSettings, EngineError> {
    let instrument = match &args.instrument {
        Some(s) => s.clone(),
        None => config
            .get_string("backtest", "instrument")
            .unwrap_or_else(|| DEFAULT_INSTRUMENT.to_string()),
    };
    validate_instrument(&instrument)?;

    let start_date = match args.start {
        Some(d) => d,
        None => match config.get_date("backtest", "start_date")? {
            Some(d) => d,
            None => parse_default_date("start_date", DEFAULT_START_DATE)?,
        },
    };
    let end_date = match args.end {
        Some(d) => d,
        None => match config.get_date("backtest", "end_date")? {
            Some(d) => d,
            None => parse_default_date("end_date", DEFAULT_END_DATE)?,
        },
    };
    validate_date_range(start_date, end_date)?;

    let short_window = match args.short_window {
        Some(v) => window_flag(v),
        None => config
            .get_int("strategy", "short_window")?
            .unwrap_or(DEFAULT_SHORT_WINDOW as i64),
    };
    let long_window = match args.long_window {
        Some(v) => window_flag(v),
        None => config
            .get_int("strategy", "long_window")?
            .unwrap_or(DEFAULT_LONG_WINDOW as i64),
    };
    validate_windows(short_window, long_window)?;

    let initial_cash = match args.initial_cash {
        Some(v) => v,
        None => config
            .get_double("backtest", "initial_cash")?
            .unwrap_or(DEFAULT_INITIAL_CASH),
    };
    validate_initial_cash(initial_cash)?;

    let risk_free_rate = config
        .get_double("backtest", "risk_free_rate")?
        .unwrap_or(0.0);
    validate_risk_free_rate(risk_free_rate)?;

    let csv_dir = args.csv_dir.clone().or_else(|| {
        config
            .get_string("data", "csv_dir")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
    });
    let source_name = match (&args.source, &args.csv_dir) {
        (Some(s), _) => s.to_lowercase(),
        (None, Some(_)) => "csv".to_string(),
        (None, None) => config
            .get_string("data", "source")
            .unwrap_or_else(|| "yahoo".to_string())
            .to_lowercase(),
    };
    validate_source(&source_name)?;
    let timeout_secs = config
        .get_int("data", "timeout_secs")?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    validate_timeout(timeout_secs)?;

    let source = if source_name == "csv" {
        DataSourceKind::Csv {
            dir: csv_dir.ok_or_else(|| EngineError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_dir".to_string(),
            })?,
        }
    } else {
        DataSourceKind::Yahoo {
            timeout: Duration::from_secs(timeout_secs.unsigned_abs()),
        }
    };

    let output = args
        .output
        .clone()
        .or_else(|| config.get_string("report", "output").map(PathBuf::from));

    Ok(BacktestSettings {
        instrument,
        start_date,
        end_date,
        // Both windows are positive after validation.
        short_window: short_window.unsigned_abs() as usize,
        long_window: long_window.unsigned_abs() as usize,
        initial_cash,
        risk_free_rate,
        source,
        output,
        tail: args.tail,
    })
}

fn window_flag(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub fn build_price_source(source: &DataSourceKind) -> Result<Box<dyn PriceSource>, EngineError> {
    match source {
        DataSourceKind::Csv { dir } => Ok(Box::new(CsvAdapter::new(dir.clone()))),
        #[cfg(feature = "yahoo")]
        DataSourceKind::Yahoo { timeout } => {
            use crate::adapters::yahoo_adapter::YahooAdapter;
            Ok(Box::new(YahooAdapter::new(*timeout)?))
        }
        #[cfg(not(feature = "yahoo"))]
        DataSourceKind::Yahoo { .. } => Err(EngineError::invalid_config(
            "source",
            "yahoo feature is required for the yahoo source",
        )),
    }
}

/// Run a backtest end to end and return the console summary.
pub fn run_backtest(args: &BacktestArgs) -> Result<String, EngineError> {
    let config = load_config(args.config.as_ref())?;
    let settings = build_settings(&config, args)?;

    // Both constructors validate before any data is fetched.
    let strategy = MovingAverageCross::new(settings.short_window, settings.long_window)?;
    let source = build_price_source(&settings.source)?;
    let backtester = Backtester::new(
        source.as_ref(),
        &strategy,
        SimulationConfig {
            initial_cash: settings.initial_cash,
        },
    )?;

    let result =
        backtester.run_detailed(&settings.instrument, settings.start_date, settings.end_date)?;
    let metrics = Metrics::compute(&result, settings.risk_free_rate);

    if let Some(path) = &settings.output {
        write_report(&CsvReportAdapter, &result, &metrics, path)?;
    }

    Ok(format_summary(&result, &metrics, &strategy, settings.tail))
}

pub fn write_report(
    report: &dyn ReportPort,
    result: &BacktestResult,
    metrics: &Metrics,
    path: &Path,
) -> Result<(), EngineError> {
    report.write(result, metrics, path)
}

pub fn format_summary(
    result: &BacktestResult,
    metrics: &Metrics,
    strategy: &dyn SignalStrategy,
    tail: usize,
) -> String {
    let curve = &result.equity_curve;
    let mut out = String::new();

    let _ = writeln!(out, "=== {}: {} ===", result.instrument, strategy.describe());
    if let (Some(first), Some(last)) = (curve.points().first(), curve.last()) {
        let _ = writeln!(
            out,
            "Period:           {} to {} ({} bars)",
            first.date,
            last.date,
            curve.len()
        );
    }
    let _ = writeln!(out, "Initial Cash:     {:.2}", result.initial_cash);
    let _ = writeln!(
        out,
        "Final Equity:     {:.2}",
        curve.final_value().unwrap_or(result.initial_cash)
    );
    let _ = writeln!(out, "Total Return:     {:.2}%", metrics.total_return * 100.0);
    let _ = writeln!(out, "Annualized:       {:.2}%", metrics.annualized_return * 100.0);
    let _ = writeln!(out, "Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    let _ = writeln!(out, "Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    let _ = writeln!(out, "Trades:           {}", metrics.trade_count);
    let position = if result.final_state.is_long() {
        format!("LONG {:.4} units", result.final_state.units_held)
    } else {
        "FLAT".to_string()
    };
    let _ = writeln!(out, "Position:         {position}");

    if tail > 0 && !curve.is_empty() {
        let _ = writeln!(out, "\n{:<12}{:>16}", "date", "equity");
        for point in curve.tail(tail) {
            let _ = writeln!(out, "{:<12}{:>16.2}", point.date, point.equity);
        }
    }

    out
}

fn run_validate(config_path: &PathBuf) -> Result<(), EngineError> {
    let config = load_config(Some(config_path))?;
    let settings = build_settings(&config, &BacktestArgs::default())?;
    MovingAverageCross::new(settings.short_window, settings.long_window)?;

    println!(
        "{}: {} {} to {}, SMA {}/{}, initial cash {:.2}",
        config_path.display(),
        settings.instrument,
        settings.start_date,
        settings.end_date,
        settings.short_window,
        settings.long_window,
        settings.initial_cash,
    );
    println!("Configuration is valid.");
    Ok(())
}
