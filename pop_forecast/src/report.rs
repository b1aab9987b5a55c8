//! Flat result rows and delimited-text output
//!
//! Model-specific parameters are merged into optional columns here and
//! nowhere else; absent values serialize as empty cells.

use crate::compare::ComparisonTable;
use crate::diagnostics::{diagnostic_rows, HistogramBin};
use crate::error::Result;
use crate::models::baseline::BaselineProjection;
use crate::models::{Evaluation, PredictionSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub model: String,
    pub train_rmse: Option<f64>,
    pub test_rmse: Option<f64>,
    pub avg_growth: Option<f64>,
    pub n_lags: Option<usize>,
    pub train_size: usize,
    pub test_size: usize,
    /// `ok`, `degraded` or `skipped: <reason>`
    pub status: String,
}

impl From<&Evaluation> for ReportRow {
    fn from(evaluation: &Evaluation) -> Self {
        match evaluation {
            Evaluation::Scored(result) => ReportRow {
                model: result.model.clone(),
                train_rmse: result.train_rmse,
                test_rmse: Some(result.test_rmse),
                avg_growth: result.params.avg_growth(),
                n_lags: result.params.n_lags(),
                train_size: result.train_size,
                test_size: result.test_size,
                status: if result.is_degraded() {
                    "degraded".to_string()
                } else {
                    "ok".to_string()
                },
            },
            Evaluation::Skipped {
                model,
                reason,
                train_size,
                test_size,
            } => ReportRow {
                model: model.clone(),
                train_rmse: None,
                test_rmse: None,
                avg_growth: None,
                n_lags: None,
                train_size: *train_size,
                test_size: *test_size,
                status: format!("skipped: {}", reason),
            },
        }
    }
}

/// Year of a baseline projection, marked as observed or projected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRow {
    pub year: i32,
    pub population_total: f64,
    pub kind: &'static str,
}

/// Serialize `rows` as CSV with a header row
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `rows` to `path`, creating parent directories as needed
pub fn save_csv<P: AsRef<Path>, T: Serialize>(path: P, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_csv(File::create(path)?, rows)
}

/// Save the comparison table
pub fn save_comparison<P: AsRef<Path>>(path: P, table: &ComparisonTable) -> Result<()> {
    save_csv(path, &table.rows())
}

/// Save any list of evaluations, such as a lag sensitivity sweep
pub fn save_evaluations<P: AsRef<Path>>(path: P, evaluations: &[Evaluation]) -> Result<()> {
    let rows: Vec<ReportRow> = evaluations.iter().map(ReportRow::from).collect();
    save_csv(path, &rows)
}

/// Save per-year actual, predicted and residual values
pub fn save_predictions<P: AsRef<Path>>(path: P, predictions: &PredictionSet) -> Result<()> {
    save_csv(path, &diagnostic_rows(predictions))
}

/// Save histogram bins
pub fn save_histogram<P: AsRef<Path>>(path: P, bins: &[HistogramBin]) -> Result<()> {
    save_csv(path, bins)
}

/// Save a baseline projection, one row per year
pub fn save_projection<P: AsRef<Path>>(path: P, projection: &BaselineProjection) -> Result<()> {
    let rows: Vec<ProjectionRow> = projection
        .series
        .records()
        .iter()
        .map(|r| ProjectionRow {
            year: r.year,
            population_total: r.population_total,
            kind: if r.year <= projection.last_historical_year {
                "historical"
            } else {
                "forecast"
            },
        })
        .collect();
    save_csv(path, &rows)
}

fn fmt_opt_f64(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<26} {:>14} {:>14} {:>11} {:>7} {:>6} {:>6}  {}",
            "model", "train_rmse", "test_rmse", "avg_growth", "n_lags", "train", "test", "status"
        )?;
        for row in self.rows() {
            writeln!(
                f,
                "{:<26} {:>14} {:>14} {:>11} {:>7} {:>6} {:>6}  {}",
                row.model,
                fmt_opt_f64(row.train_rmse, 0),
                fmt_opt_f64(row.test_rmse, 0),
                fmt_opt_f64(row.avg_growth, 6),
                row.n_lags.map_or("-".to_string(), |n| n.to_string()),
                row.train_size,
                row.test_size,
                row.status
            )?;
        }
        Ok(())
    }
}
