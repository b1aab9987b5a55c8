//! Year-over-year growth calculations
//!
//! Contains the primitives used by the constant-growth baseline:
//! - Relative change between consecutive observations
//! - NaN-aware averaging
//! - Geometric (compounding) projection

use statrs::statistics::Statistics;

/// Relative change between each pair of consecutive values.
///
/// Returns `values.len() - 1` rates (or none for fewer than two values).
pub fn growth_rates(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Arithmetic mean of the non-NaN entries.
///
/// An input with no defined entries yields `NaN` rather than zero, so callers
/// can tell an undefined statistic apart from a genuine zero mean.
pub fn nan_mean(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .collect::<Vec<f64>>()
        .mean()
}

/// Compound `start` by `rate` for `steps` periods.
///
/// Each step multiplies the previous value by `1 + rate`, so entry `h - 1`
/// equals `start * (1 + rate)^h`.
pub fn geometric_projection(start: f64, rate: f64, steps: usize) -> Vec<f64> {
    let mut projected = Vec::with_capacity(steps);
    let mut current = start;

    for _ in 0..steps {
        current *= 1.0 + rate;
        projected.push(current);
    }

    projected
}
