//! CSV equity curve report adapter.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::EngineError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;

/// Writes `date,equity` rows, one per simulated bar.
pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &Path,
    ) -> Result<(), EngineError> {
        let file = File::create(output_path)?;
        let mut wtr = csv::Writer::from_writer(file);

        wtr.write_record(["date", "equity"]).map_err(csv_to_io)?;
        for point in &result.equity_curve {
            wtr.write_record([point.date.to_string(), point.equity.to_string()])
                .map_err(csv_to_io)?;
        }
        wtr.flush()?;

        info!(
            path = %output_path.display(),
            rows = result.equity_curve.len(),
            total_return = metrics.total_return,
            "equity curve written"
        );
        Ok(())
    }
}

fn csv_to_io(err: csv::Error) -> EngineError {
    EngineError::Io(err.into())
}
