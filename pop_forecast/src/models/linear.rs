//! Linear regression on engineered features
//!
//! Predicts next year's population from the current level, the growth rate
//! and lagged populations. Features are used at their raw magnitudes, so the
//! coefficients read in population units.

use crate::error::Result;
use crate::features::{lag_column, FeatureTable, GROWTH_RATE, POPULATION_TOTAL};
use crate::models::{
    fit_regression, skip_empty_split, Evaluation, EvaluationInput, EvaluationResult,
    ModelEvaluator, ModelParams, SkipReason,
};
use crate::split::chronological_split;
use tracing::{debug, info, warn};

/// Name reported in the comparison table
pub const MODEL_NAME: &str = "Linear regression";

/// Default candidate features, in selection order
pub fn default_candidates() -> Vec<String> {
    vec![
        POPULATION_TOTAL.to_string(),
        GROWTH_RATE.to_string(),
        lag_column(1),
        lag_column(2),
    ]
}

/// Candidates that exist in `table`, in candidate order
pub fn select_features(table: &FeatureTable, candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| table.has_column(c))
        .cloned()
        .collect()
}

/// Fit and score a linear regression of `target_pop_next` on the available
/// candidate features.
///
/// An empty split or an empty feature selection yields
/// [`Evaluation::Skipped`] instead of a fit on degenerate input.
pub fn fit_linear(
    table: &FeatureTable,
    test_start_year: i32,
    candidates: &[String],
) -> Result<Evaluation> {
    let split = chronological_split(table.rows(), test_start_year);

    if let Some(skipped) = skip_empty_split(MODEL_NAME, test_start_year, &split) {
        return Ok(skipped);
    }

    let features = select_features(table, candidates);
    if features.is_empty() {
        warn!(model = MODEL_NAME, ?candidates, "skipping evaluation: no feature columns found");
        return Ok(Evaluation::skipped(MODEL_NAME, SkipReason::NoFeatures, &split));
    }
    debug!(?features, "linear regression features");

    let fit = fit_regression(&split, &features)?;

    info!(
        model = MODEL_NAME,
        train_rmse = fit.train_rmse,
        train_r_squared = fit.train_r_squared,
        test_rmse = fit.test_rmse,
        train_size = split.train_size(),
        test_size = split.test_size(),
        "linear regression fitted"
    );

    Ok(Evaluation::Scored(EvaluationResult {
        model: MODEL_NAME.to_string(),
        train_rmse: Some(fit.train_rmse),
        test_rmse: fit.test_rmse,
        train_size: split.train_size(),
        test_size: split.test_size(),
        params: ModelParams::Linear {
            feature_names: features,
            coefficients: fit.model.coefficients().to_vec(),
            intercept: fit.model.intercept(),
            r_squared: fit.train_r_squared,
        },
        test_predictions: fit.test_predictions,
    }))
}

/// Linear regression evaluator with its candidate feature list
#[derive(Debug, Clone)]
pub struct LinearEvaluator {
    pub candidates: Vec<String>,
}

impl Default for LinearEvaluator {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
        }
    }
}

impl ModelEvaluator for LinearEvaluator {
    fn name(&self) -> String {
        MODEL_NAME.to_string()
    }

    fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<Evaluation> {
        fit_linear(input.features, input.test_start_year, &self.candidates)
    }
}
