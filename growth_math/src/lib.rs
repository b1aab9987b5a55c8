//! # Growth Math
//!
//! Mathematical building blocks for yearly population models.
//! This crate provides growth-rate calculations, forecast error metrics and
//! an ordinary least squares solver shared by the regression-based models.

use thiserror::Error;

pub mod growth;
pub mod metrics;
pub mod regression;

pub use growth::{geometric_projection, growth_rates, nan_mean};
pub use metrics::{mean_absolute_error, mean_squared_error, root_mean_squared_error};
pub use regression::LinearRegression;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;
