//! Best-effort post-processing after a comparison run
//!
//! Each task runs inside its own failure boundary: an error or a panic is
//! logged and recorded, and the remaining tasks still run.

use crate::compare::ComparisonTable;
use crate::config::ComparisonConfig;
use crate::data::YearlySeries;
use crate::diagnostics::{residual_histogram, DEFAULT_HISTOGRAM_BINS};
use crate::error::{ForecastError, Result};
use crate::models::ar::{model_name, run_lag_sensitivity};
use crate::models::baseline::project;
use crate::models::linear;
use crate::report::{save_evaluations, save_histogram, save_predictions, save_projection};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{info, warn};

type TaskFn<'a> = Box<dyn FnOnce() -> Result<()> + 'a>;

/// A named, independently skippable step
pub struct PostTask<'a> {
    name: String,
    run: TaskFn<'a>,
}

impl<'a> PostTask<'a> {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: FnOnce() -> Result<()> + 'a,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// How a task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Failed(String),
}

/// Outcome of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub name: String,
    pub status: TaskStatus,
}

impl TaskReport {
    pub fn succeeded(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Run every task in order, isolating failures
pub fn run_best_effort(tasks: Vec<PostTask<'_>>) -> Vec<TaskReport> {
    tasks
        .into_iter()
        .map(|task| {
            let PostTask { name, run } = task;
            let status = match panic::catch_unwind(AssertUnwindSafe(run)) {
                Ok(Ok(())) => {
                    info!(task = %name, "post-processing task completed");
                    TaskStatus::Completed
                }
                Ok(Err(err)) => {
                    warn!(task = %name, error = %err, "skipped post-processing task");
                    TaskStatus::Failed(err.to_string())
                }
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "task panicked".to_string());
                    warn!(task = %name, error = %message, "post-processing task panicked");
                    TaskStatus::Failed(message)
                }
            };
            TaskReport { name, status }
        })
        .collect()
}

/// Write residual diagnostics for the scored evaluation named `model`
fn diagnostics_task(table: &ComparisonTable, model: &str, tables_dir: &Path, prefix: &str) -> Result<()> {
    let result = table.find(model).ok_or_else(|| {
        ForecastError::DataError(format!("No scored evaluation for {}", model))
    })?;

    save_predictions(
        tables_dir.join(format!("{}_actual_vs_pred_test.csv", prefix)),
        &result.test_predictions,
    )?;
    let bins = residual_histogram(&result.test_predictions.residuals(), DEFAULT_HISTOGRAM_BINS)?;
    save_histogram(tables_dir.join(format!("{}_residual_hist_test.csv", prefix)), &bins)
}

/// The standard follow-up steps of a comparison run, writing into `tables_dir`:
/// baseline projection, linear and AR diagnostics, and the AR lag sweep.
pub fn standard_tasks<'a>(
    series: &'a YearlySeries,
    config: &'a ComparisonConfig,
    table: &'a ComparisonTable,
    tables_dir: &'a Path,
) -> Vec<PostTask<'a>> {
    vec![
        PostTask::new("baseline_projection", move || {
            let projection = project(series, config.start_year_for_growth, config.horizon)?;
            save_projection(tables_dir.join("baseline_forecast.csv"), &projection)
        }),
        PostTask::new("linear_diagnostics", move || {
            diagnostics_task(table, linear::MODEL_NAME, tables_dir, "linear")
        }),
        PostTask::new("ar_diagnostics", move || {
            let prefix = format!("ar{}", config.n_lags);
            diagnostics_task(table, &model_name(config.n_lags), tables_dir, &prefix)
        }),
        PostTask::new("lag_sensitivity", move || {
            let sweep = run_lag_sensitivity(series, config.test_start_year, config.max_lag)?;
            save_evaluations(tables_dir.join("lag_sensitivity_ar.csv"), &sweep)
        }),
    ]
}
