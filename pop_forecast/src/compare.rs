//! Side-by-side evaluation of every model on one chronological split

use crate::config::ComparisonConfig;
use crate::data::{SeriesProvider, YearlySeries};
use crate::error::Result;
use crate::features::build_features;
use crate::models::ar::ArEvaluator;
use crate::models::baseline::BaselineEvaluator;
use crate::models::linear::LinearEvaluator;
use crate::models::{Evaluation, EvaluationInput, EvaluationResult, ModelEvaluator};
use crate::report::ReportRow;
use tracing::{debug, info, warn};

/// Evaluations of one comparison run, in evaluator order
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    evaluations: Vec<Evaluation>,
}

impl ComparisonTable {
    pub fn new(evaluations: Vec<Evaluation>) -> Self {
        Self { evaluations }
    }

    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// Flat rows for serialization
    pub fn rows(&self) -> Vec<ReportRow> {
        self.evaluations.iter().map(ReportRow::from).collect()
    }

    /// Scored evaluation with the given model name
    pub fn find(&self, model: &str) -> Option<&EvaluationResult> {
        self.evaluations
            .iter()
            .filter_map(Evaluation::scored)
            .find(|r| r.model == model)
    }

    /// Scored evaluation with the lowest finite test RMSE
    pub fn best(&self) -> Option<&EvaluationResult> {
        self.evaluations
            .iter()
            .filter_map(Evaluation::scored)
            .filter(|r| r.test_rmse.is_finite())
            .min_by(|a, b| a.test_rmse.total_cmp(&b.test_rmse))
    }
}

/// The baseline, linear and AR evaluators configured by `config`
pub fn default_evaluators(config: &ComparisonConfig) -> Vec<Box<dyn ModelEvaluator>> {
    vec![
        Box::new(BaselineEvaluator::new(config.start_year_for_growth)),
        Box::new(LinearEvaluator {
            candidates: config.linear_features.clone(),
        }),
        Box::new(ArEvaluator::new(config.n_lags)),
    ]
}

/// Load the series from `provider` and compare all models on it
pub fn compare_all_models<P>(provider: &P, config: &ComparisonConfig) -> Result<ComparisonTable>
where
    P: SeriesProvider + ?Sized,
{
    config.validate()?;
    let series = provider.load()?;
    info!(
        years = series.len(),
        first_year = series.first().map(|r| r.year),
        last_year = series.last().map(|r| r.year),
        "loaded population series"
    );
    compare_series(&series, config)
}

/// Compare all models on an already loaded series
pub fn compare_series(series: &YearlySeries, config: &ComparisonConfig) -> Result<ComparisonTable> {
    config.validate()?;
    let features = build_features(series, config.n_lags)?;
    let input = EvaluationInput {
        series,
        features: &features,
        test_start_year: config.test_start_year,
    };

    let evaluators = default_evaluators(config);
    let mut evaluations = Vec::with_capacity(evaluators.len());

    for evaluator in &evaluators {
        debug!(model = %evaluator.name(), "running evaluator");
        let evaluation = evaluator.evaluate(&input)?;
        match &evaluation {
            Evaluation::Scored(result) if result.is_degraded() => {
                warn!(model = %result.model, "evaluation produced undefined error metrics")
            }
            Evaluation::Skipped { model, reason, .. } => {
                warn!(model = %model, %reason, "model could not be evaluated")
            }
            Evaluation::Scored(_) => {}
        }
        evaluations.push(evaluation);
    }

    Ok(ComparisonTable { evaluations })
}
