//! # Pop Forecast
//!
//! Compares yearly population forecasting models on a chronological split.
//!
//! ## Features
//!
//! - Validated yearly series with in-memory and CSV providers
//! - Feature table with growth rate, lagged populations and a next-year target
//! - Constant-growth baseline with recursive multi-step forecasts
//! - Linear regression on engineered features
//! - Autoregressive AR(p) models and a lag sensitivity sweep
//! - A comparison table that flattens heterogeneous results into one report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pop_forecast::{compare_all_models, ComparisonConfig, CsvSeriesProvider};
//!
//! let provider = CsvSeriesProvider::new("population.csv");
//! let config = ComparisonConfig::default();
//!
//! let table = compare_all_models(&provider, &config)?;
//! println!("{}", table);
//! # Ok::<(), pop_forecast::ForecastError>(())
//! ```

pub mod compare;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod split;

// Re-export commonly used types
pub use crate::compare::{compare_all_models, compare_series, ComparisonTable};
pub use crate::config::ComparisonConfig;
pub use crate::data::{CsvSeriesProvider, SeriesProvider, YearRecord, YearlySeries};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{build_features, FeatureRow, FeatureTable};
pub use crate::models::ar::{fit_ar, run_lag_sensitivity};
pub use crate::models::baseline::{estimate_growth, evaluate_baseline_constant_growth, forecast};
pub use crate::models::linear::fit_linear;
pub use crate::models::{Evaluation, EvaluationResult, ModelEvaluator, ModelParams};
pub use crate::report::ReportRow;
pub use crate::split::{chronological_split, Split};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
