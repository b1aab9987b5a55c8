//! Autoregressive model on lagged populations
//!
//! AR(p) predicts next year's population as a linear function of the `p`
//! preceding years only.

use crate::data::YearlySeries;
use crate::error::{ForecastError, Result};
use crate::features::{build_features, check_lag_order, lag_column, FeatureTable};
use crate::models::{
    fit_regression, skip_empty_split, Evaluation, EvaluationInput, EvaluationResult,
    ModelEvaluator, ModelParams,
};
use crate::split::chronological_split;
use tracing::info;

/// Name reported for an AR model of order `n_lags`
pub fn model_name(n_lags: usize) -> String {
    format!("AR({})", n_lags)
}

/// Fit and score AR(`n_lags`) on the lag columns of `table`.
///
/// The table must have been built with at least `n_lags` lags; a missing lag
/// column is a [`ForecastError::DataShape`] error. An empty split is reported
/// as [`Evaluation::Skipped`].
pub fn fit_ar(table: &FeatureTable, test_start_year: i32, n_lags: usize) -> Result<Evaluation> {
    check_lag_order("AR order", n_lags)?;

    let lag_columns: Vec<String> = (1..=n_lags).map(lag_column).collect();
    if let Some(missing) = lag_columns.iter().find(|c| !table.has_column(c)) {
        return Err(ForecastError::DataShape(format!(
            "Missing column {}. Available columns: {:?}",
            missing,
            table.column_names()
        )));
    }

    let name = model_name(n_lags);
    let split = chronological_split(table.rows(), test_start_year);
    if let Some(skipped) = skip_empty_split(&name, test_start_year, &split) {
        return Ok(skipped);
    }

    let fit = fit_regression(&split, &lag_columns)?;

    info!(
        model = %name,
        train_rmse = fit.train_rmse,
        train_r_squared = fit.train_r_squared,
        test_rmse = fit.test_rmse,
        train_size = split.train_size(),
        test_size = split.test_size(),
        "AR model fitted"
    );

    Ok(Evaluation::Scored(EvaluationResult {
        model: name,
        train_rmse: Some(fit.train_rmse),
        test_rmse: fit.test_rmse,
        train_size: split.train_size(),
        test_size: split.test_size(),
        params: ModelParams::Autoregressive {
            n_lags,
            coefficients: fit.model.coefficients().to_vec(),
            intercept: fit.model.intercept(),
            r_squared: fit.train_r_squared,
        },
        test_predictions: fit.test_predictions,
    }))
}

/// Refit AR(p) for every `p` in `1..=max_lag`.
///
/// Each order gets its own feature table, so higher orders lose a few of the
/// earliest train rows. Returns exactly `max_lag` evaluations.
pub fn run_lag_sensitivity(
    series: &YearlySeries,
    test_start_year: i32,
    max_lag: usize,
) -> Result<Vec<Evaluation>> {
    check_lag_order("max_lag", max_lag)?;

    (1..=max_lag)
        .map(|p| {
            let table = build_features(series, p)?;
            fit_ar(&table, test_start_year, p)
        })
        .collect()
}

/// AR evaluator with a fixed order
#[derive(Debug, Clone)]
pub struct ArEvaluator {
    pub n_lags: usize,
}

impl ArEvaluator {
    pub fn new(n_lags: usize) -> Self {
        Self { n_lags }
    }
}

impl ModelEvaluator for ArEvaluator {
    fn name(&self) -> String {
        model_name(self.n_lags)
    }

    fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<Evaluation> {
        fit_ar(input.features, input.test_start_year, self.n_lags)
    }
}
