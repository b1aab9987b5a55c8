//! Forecasting models and their evaluation records

use crate::data::YearlySeries;
use crate::error::Result;
use crate::features::{FeatureRow, FeatureTable};
use crate::split::Split;
use growth_math::{root_mean_squared_error, LinearRegression};
use serde::Serialize;
use std::fmt;
use tracing::warn;

pub mod ar;
pub mod baseline;
pub mod linear;

/// Model-specific part of an evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParams {
    /// Constant growth rate applied recursively
    Baseline { avg_growth: f64 },
    /// Least squares over engineered features
    Linear {
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
        r_squared: f64,
    },
    /// Least squares over lagged populations only
    Autoregressive {
        n_lags: usize,
        coefficients: Vec<f64>,
        intercept: f64,
        r_squared: f64,
    },
}

impl ModelParams {
    pub fn avg_growth(&self) -> Option<f64> {
        match self {
            ModelParams::Baseline { avg_growth } => Some(*avg_growth),
            _ => None,
        }
    }

    pub fn n_lags(&self) -> Option<usize> {
        match self {
            ModelParams::Autoregressive { n_lags, .. } => Some(*n_lags),
            _ => None,
        }
    }

    /// Train R-squared of the regression models
    pub fn r_squared(&self) -> Option<f64> {
        match self {
            ModelParams::Linear { r_squared, .. } | ModelParams::Autoregressive { r_squared, .. } => {
                Some(*r_squared)
            }
            ModelParams::Baseline { .. } => None,
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            ModelParams::Linear { feature_names, .. } => Some(feature_names),
            _ => None,
        }
    }
}

/// Predictions over the test period, aligned by the year being predicted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionSet {
    pub target_years: Vec<i32>,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

impl PredictionSet {
    pub fn len(&self) -> usize {
        self.actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }

    /// `actual - predicted` for each year
    pub fn residuals(&self) -> Vec<f64> {
        growth_math::metrics::residuals(&self.actual, &self.predicted)
    }
}

/// Outcome of one successful model evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub model: String,
    /// In-sample error; `None` for models that never predict the train period
    pub train_rmse: Option<f64>,
    pub test_rmse: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub params: ModelParams,
    pub test_predictions: PredictionSet,
}

impl EvaluationResult {
    /// True when an undefined statistic leaked into the reported errors
    pub fn is_degraded(&self) -> bool {
        !self.test_rmse.is_finite() || self.train_rmse.map_or(false, |r| !r.is_finite())
    }
}

/// Why a model could not be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The train or test side of the split has no rows
    EmptySplit,
    /// None of the requested feature columns exist
    NoFeatures,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptySplit => write!(f, "train or test split is empty"),
            SkipReason::NoFeatures => write!(f, "no feature columns available"),
        }
    }
}

/// Result of running one evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Scored(EvaluationResult),
    Skipped {
        model: String,
        reason: SkipReason,
        train_size: usize,
        test_size: usize,
    },
}

impl Evaluation {
    pub(crate) fn skipped<T>(model: &str, reason: SkipReason, split: &Split<T>) -> Self {
        Evaluation::Skipped {
            model: model.to_string(),
            reason,
            train_size: split.train_size(),
            test_size: split.test_size(),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Evaluation::Scored(result) => &result.model,
            Evaluation::Skipped { model, .. } => model,
        }
    }

    pub fn scored(&self) -> Option<&EvaluationResult> {
        match self {
            Evaluation::Scored(result) => Some(result),
            Evaluation::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Evaluation::Skipped { .. })
    }

    pub fn train_size(&self) -> usize {
        match self {
            Evaluation::Scored(result) => result.train_size,
            Evaluation::Skipped { train_size, .. } => *train_size,
        }
    }

    pub fn test_size(&self) -> usize {
        match self {
            Evaluation::Scored(result) => result.test_size,
            Evaluation::Skipped { test_size, .. } => *test_size,
        }
    }
}

/// Shared, read-only inputs for every evaluator in one comparison run
/// Turn an empty split into a skipped evaluation, or `None` when both
/// sides have rows
pub(crate) fn skip_empty_split<T>(
    model: &str,
    test_start_year: i32,
    split: &Split<T>,
) -> Option<Evaluation> {
    let err = split.ensure_non_empty().err()?;
    warn!(model, test_start_year, error = %err, "skipping evaluation");
    Some(Evaluation::skipped(model, SkipReason::EmptySplit, split))
}

#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub series: &'a YearlySeries,
    pub features: &'a FeatureTable,
    pub test_start_year: i32,
}

/// A model that can be scored on a chronological split
pub trait ModelEvaluator {
    /// Display name used in the comparison table
    fn name(&self) -> String;

    /// Fit on the train side, score on the test side
    fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<Evaluation>;
}

/// Least squares fit over named feature columns, scored on both split sides
#[derive(Debug, Clone)]
pub(crate) struct RegressionFit {
    pub model: LinearRegression,
    pub train_rmse: f64,
    /// Coefficient of determination on the train rows
    pub train_r_squared: f64,
    pub test_rmse: f64,
    pub test_predictions: PredictionSet,
}

/// Fit `target_pop_next` on `columns` using the train rows of `split`.
///
/// Callers check the split and the columns beforehand; both sides must be
/// non-empty.
pub(crate) fn fit_regression(split: &Split<FeatureRow>, columns: &[String]) -> Result<RegressionFit> {
    let x_train = design_matrix(&split.train, columns);
    let y_train = targets(&split.train);
    let x_test = design_matrix(&split.test, columns);
    let y_test = targets(&split.test);

    let model = LinearRegression::fit(&x_train, &y_train)?;
    let train_pred = model.predict(&x_train)?;
    let test_pred = model.predict(&x_test)?;

    Ok(RegressionFit {
        train_r_squared: model.r_squared(&x_train, &y_train)?,
        train_rmse: root_mean_squared_error(&y_train, &train_pred),
        test_rmse: root_mean_squared_error(&y_test, &test_pred),
        test_predictions: PredictionSet {
            // Row `t` predicts the population of `t + 1`
            target_years: split.test.iter().map(|r| r.year + 1).collect(),
            actual: y_test,
            predicted: test_pred,
        },
        model,
    })
}

fn design_matrix(rows: &[FeatureRow], columns: &[String]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.value(c).unwrap_or(f64::NAN))
                .collect()
        })
        .collect()
}

fn targets(rows: &[FeatureRow]) -> Vec<f64> {
    rows.iter().map(|row| row.target_pop_next).collect()
}
