//! Residual diagnostics for scored evaluations
//!
//! Produces the arrays that plotting tools consume: actual against predicted
//! per year, residuals and a residual histogram.

use crate::error::{ForecastError, Result};
use crate::models::PredictionSet;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Number of histogram bins used when none is given
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// One predicted year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRow {
    pub target_year: i32,
    pub actual: f64,
    pub predicted: f64,
    pub residual: f64,
}

/// Per-year view of a prediction set
pub fn diagnostic_rows(predictions: &PredictionSet) -> Vec<DiagnosticRow> {
    predictions
        .target_years
        .iter()
        .zip(predictions.actual.iter())
        .zip(predictions.predicted.iter())
        .map(|((&target_year, &actual), &predicted)| DiagnosticRow {
            target_year,
            actual,
            predicted,
            residual: actual - predicted,
        })
        .collect()
}

/// Half-open bin `[lower, upper)`; the last bin also holds its upper edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of the finite residuals.
///
/// When every residual is identical the range is widened by 0.5 on each side.
pub fn residual_histogram(residuals: &[f64], bins: usize) -> Result<Vec<HistogramBin>> {
    if bins == 0 {
        return Err(ForecastError::InvalidParameter(
            "Histogram needs at least one bin".to_string(),
        ));
    }

    let finite: Vec<f64> = residuals.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(ForecastError::DataError(
            "No finite residuals to bin".to_string(),
        ));
    }

    let mut lower = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut upper = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lower == upper {
        lower -= 0.5;
        upper += 0.5;
    }

    let width = (upper - lower) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in &finite {
        let index = (((value - lower) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lower + i as f64 * width,
            upper: if i + 1 == bins {
                upper
            } else {
                lower + (i + 1) as f64 * width
            },
            count,
        })
        .collect())
}

/// Summary statistics of the residuals
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualSummary {
    pub mean: f64,
    /// Sample standard deviation; `NaN` with fewer than two residuals
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub mae: f64,
}

/// Summarize the residuals of a prediction set, or `None` when it is empty
pub fn summarize_residuals(predictions: &PredictionSet) -> Option<ResidualSummary> {
    if predictions.is_empty() {
        return None;
    }

    let residuals = predictions.residuals();
    Some(ResidualSummary {
        mean: (&residuals).mean(),
        std_dev: (&residuals).std_dev(),
        min: residuals.iter().copied().fold(f64::INFINITY, f64::min),
        max: residuals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mae: growth_math::mean_absolute_error(&predictions.actual, &predictions.predicted),
    })
}

impl std::fmt::Display for ResidualSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Residual Summary:")?;
        writeln!(f, "  Mean:    {:.2}", self.mean)?;
        writeln!(f, "  Std Dev: {:.2}", self.std_dev)?;
        writeln!(f, "  Min:     {:.2}", self.min)?;
        writeln!(f, "  Max:     {:.2}", self.max)?;
        writeln!(f, "  MAE:     {:.2}", self.mae)?;
        Ok(())
    }
}
