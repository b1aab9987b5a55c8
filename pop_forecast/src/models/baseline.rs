//! Constant-growth baseline
//!
//! Estimates the mean year-over-year growth rate over a historical window and
//! compounds it forward. The model never predicts the period it was estimated
//! on, so it has no in-sample error.

use crate::data::{YearRecord, YearlySeries};
use crate::error::{ForecastError, Result};
use crate::models::{
    skip_empty_split, Evaluation, EvaluationInput, EvaluationResult, ModelEvaluator, ModelParams,
    PredictionSet, SkipReason,
};
use crate::split::chronological_split;
use growth_math::{geometric_projection, growth_rates, nan_mean, root_mean_squared_error};
use tracing::{debug, info, warn};

/// Name reported in the comparison table
pub const MODEL_NAME: &str = "Baseline constant growth";

/// Mean annual growth rate over `start_year..=end_year`.
///
/// Either bound may be open. Growth rates are taken between consecutive rows
/// inside the window, so a window with fewer than two rows yields `NaN`.
pub fn estimate_growth(series: &YearlySeries, start_year: Option<i32>, end_year: Option<i32>) -> f64 {
    let window = series.window(start_year, end_year);
    nan_mean(&growth_rates(&window.populations()))
}

/// Extend `series` by `horizon` years of constant growth.
///
/// The continuation starts from the last observed year; the returned series
/// holds the original records followed by the projected ones.
pub fn forecast(series: &YearlySeries, avg_growth: f64, horizon: usize) -> Result<YearlySeries> {
    let last = series.last().ok_or_else(|| {
        ForecastError::DataError("Cannot forecast from an empty series".to_string())
    })?;

    if !avg_growth.is_finite() || avg_growth <= -1.0 {
        return Err(ForecastError::InvalidParameter(format!(
            "Growth rate must be finite and greater than -1, got {}",
            avg_growth
        )));
    }

    let mut records = series.records().to_vec();
    records.extend(
        geometric_projection(last.population_total, avg_growth, horizon)
            .into_iter()
            .zip(1..)
            .map(|(population, step)| YearRecord::new(last.year + step, population)),
    );

    YearlySeries::new(records)
}

/// Historical series followed by a constant-growth continuation
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineProjection {
    pub avg_growth: f64,
    pub last_historical_year: i32,
    pub series: YearlySeries,
}

impl BaselineProjection {
    /// Records after the last historical year
    pub fn forecast_records(&self) -> &[YearRecord] {
        let split_at = self
            .series
            .records()
            .partition_point(|r| r.year <= self.last_historical_year);
        &self.series.records()[split_at..]
    }
}

/// Estimate growth from `start_year_for_growth` over the whole series and
/// project `horizon` years past its end.
pub fn project(
    series: &YearlySeries,
    start_year_for_growth: i32,
    horizon: usize,
) -> Result<BaselineProjection> {
    let last_historical_year = series
        .last()
        .map(|r| r.year)
        .ok_or_else(|| ForecastError::DataError("Cannot project an empty series".to_string()))?;

    let avg_growth = estimate_growth(series, Some(start_year_for_growth), None);
    info!(
        start_year = start_year_for_growth,
        avg_growth_pct = avg_growth * 100.0,
        "estimated baseline growth"
    );

    Ok(BaselineProjection {
        avg_growth,
        last_historical_year,
        series: forecast(series, avg_growth, horizon)?,
    })
}

/// Score the constant-growth model on a chronological split.
///
/// Growth is estimated on train years from `start_year_for_growth` on, then
/// compounded from the last train value for as many steps as there are test
/// years. Errors compound; test actuals are never fed back.
pub fn evaluate_baseline_constant_growth(
    series: &YearlySeries,
    test_start_year: i32,
    start_year_for_growth: i32,
) -> Result<Evaluation> {
    let split = chronological_split(series.records(), test_start_year);

    if let Some(skipped) = skip_empty_split(MODEL_NAME, test_start_year, &split) {
        return Ok(skipped);
    }
    let Some(last_train) = split.train.last().copied() else {
        return Ok(Evaluation::skipped(MODEL_NAME, SkipReason::EmptySplit, &split));
    };

    let avg_growth = estimate_growth(series, Some(start_year_for_growth), Some(last_train.year));
    if avg_growth.is_nan() {
        warn!(
            start_year_for_growth,
            last_train_year = last_train.year,
            "growth window has fewer than two observations; estimate is undefined"
        );
    }

    let predicted = geometric_projection(last_train.population_total, avg_growth, split.test.len());
    let actual: Vec<f64> = split.test.iter().map(|r| r.population_total).collect();
    let test_rmse = root_mean_squared_error(&actual, &predicted);

    debug!(
        train_size = split.train_size(),
        test_size = split.test_size(),
        "baseline split"
    );
    info!(
        model = MODEL_NAME,
        avg_growth_pct = avg_growth * 100.0,
        test_rmse,
        "baseline constant growth evaluated"
    );

    Ok(Evaluation::Scored(EvaluationResult {
        model: MODEL_NAME.to_string(),
        train_rmse: None,
        test_rmse,
        train_size: split.train_size(),
        test_size: split.test_size(),
        params: ModelParams::Baseline { avg_growth },
        test_predictions: PredictionSet {
            target_years: split.test.iter().map(|r| r.year).collect(),
            actual,
            predicted,
        },
    }))
}

/// Baseline evaluator with its growth window start
#[derive(Debug, Clone)]
pub struct BaselineEvaluator {
    pub start_year_for_growth: i32,
}

impl BaselineEvaluator {
    pub fn new(start_year_for_growth: i32) -> Self {
        Self {
            start_year_for_growth,
        }
    }
}

impl ModelEvaluator for BaselineEvaluator {
    fn name(&self) -> String {
        MODEL_NAME.to_string()
    }

    fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<Evaluation> {
        evaluate_baseline_constant_growth(
            input.series,
            input.test_start_year,
            self.start_year_for_growth,
        )
    }
}
