//! Ordinary least squares regression
//!
//! Fits `y = intercept + X * beta` without regularization or feature scaling.
//! The design matrix is centred column-wise and solved through a singular value
//! decomposition, so collinear inputs (a population level next to its own lags)
//! yield the minimum-norm solution instead of an error.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// A fitted multivariate linear regression with intercept
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    /// One coefficient per feature column, in input order
    coefficients: Vec<f64>,
    /// Intercept term
    intercept: f64,
}

impl LinearRegression {
    /// Fit the model on row-major features against `target`.
    ///
    /// Every row must have the same, non-zero number of features and all
    /// values must be finite.
    pub fn fit(rows: &[Vec<f64>], target: &[f64]) -> Result<Self> {
        if rows.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a regression on zero observations".to_string(),
            ));
        }

        if rows.len() != target.len() {
            return Err(MathError::InvalidInput(format!(
                "Feature rows ({}) and target values ({}) differ in length",
                rows.len(),
                target.len()
            )));
        }

        let n_features = rows[0].len();
        if n_features == 0 {
            return Err(MathError::InvalidInput(
                "At least one feature column is required".to_string(),
            ));
        }

        if let Some(pos) = rows.iter().position(|r| r.len() != n_features) {
            return Err(MathError::InvalidInput(format!(
                "Row {} has {} features, expected {}",
                pos,
                rows[pos].len(),
                n_features
            )));
        }

        let all_finite = rows.iter().flatten().chain(target.iter()).all(|v| v.is_finite());
        if !all_finite {
            return Err(MathError::InvalidInput(
                "Regression inputs must be finite".to_string(),
            ));
        }

        let n = rows.len();
        let x_means: Vec<f64> = (0..n_features)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = target.iter().sum::<f64>() / n as f64;

        let x = DMatrix::from_fn(n, n_features, |i, j| rows[i][j] - x_means[j]);
        let y = DVector::from_iterator(n, target.iter().map(|v| v - y_mean));

        let svd = x.svd(true, true);
        let largest = svd.singular_values.max();

        // A constant design carries no slope information
        let coefficients: Vec<f64> = if largest <= 0.0 {
            vec![0.0; n_features]
        } else {
            let cutoff = f64::EPSILON * n.max(n_features) as f64 * largest;
            let beta = svd
                .solve(&y, cutoff)
                .map_err(|e| MathError::CalculationError(e.to_string()))?;
            beta.iter().copied().collect()
        };

        let intercept = y_mean
            - coefficients
                .iter()
                .zip(x_means.iter())
                .map(|(b, m)| b * m)
                .sum::<f64>();

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Predict a single observation
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} features, got {}",
                self.coefficients.len(),
                row.len()
            )));
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(b, x)| b * x)
                .sum::<f64>())
    }

    /// Predict every row
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Coefficient of determination on the given data.
    ///
    /// A constant target is reported as a perfect fit.
    pub fn r_squared(&self, rows: &[Vec<f64>], target: &[f64]) -> Result<f64> {
        if rows.len() != target.len() || target.is_empty() {
            return Err(MathError::InvalidInput(
                "R-squared needs matching, non-empty inputs".to_string(),
            ));
        }

        let predicted = self.predict(rows)?;
        let mean = target.iter().sum::<f64>() / target.len() as f64;
        let ss_total: f64 = target.iter().map(|y| (y - mean).powi(2)).sum();
        let ss_residual: f64 = target
            .iter()
            .zip(predicted.iter())
            .map(|(y, p)| (y - p).powi(2))
            .sum();

        if ss_total.abs() < 1e-10 {
            return Ok(1.0);
        }

        Ok(1.0 - ss_residual / ss_total)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_recovers_exact_plane() {
        // y = 3 + 2*a - 0.5*b
        let rows: Vec<Vec<f64>> = vec![
            vec![1.0, 4.0],
            vec![2.0, 1.0],
            vec![3.0, 7.0],
            vec![4.0, 2.0],
            vec![5.0, 9.0],
        ];
        let target: Vec<f64> = rows.iter().map(|r| 3.0 + 2.0 * r[0] - 0.5 * r[1]).collect();

        let model = LinearRegression::fit(&rows, &target).unwrap();

        assert_relative_eq!(model.coefficients()[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(model.coefficients()[1], -0.5, epsilon = 1e-9);
        assert_relative_eq!(model.intercept(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(model.r_squared(&rows, &target).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_columns_still_fit() {
        // Second column duplicates the first
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, i as f64]).collect();
        let target: Vec<f64> = (0..6).map(|i| 10.0 + 4.0 * i as f64).collect();

        let model = LinearRegression::fit(&rows, &target).unwrap();
        let predicted = model.predict(&rows).unwrap();

        for (p, t) in predicted.iter().zip(target.iter()) {
            assert_relative_eq!(*p, *t, epsilon = 1e-8);
        }
        // Minimum-norm solution splits the slope evenly
        assert_relative_eq!(model.coefficients()[0], 2.0, epsilon = 1e-8);
        assert_relative_eq!(model.coefficients()[1], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn test_single_observation_predicts_its_target() {
        let model = LinearRegression::fit(&[vec![5.0]], &[42.0]).unwrap();
        assert_eq!(model.coefficients(), &[0.0]);
        assert_relative_eq!(model.predict_one(&[100.0]).unwrap(), 42.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            LinearRegression::fit(&[], &[]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(LinearRegression::fit(&[vec![1.0]], &[1.0, 2.0]).is_err());
        assert!(LinearRegression::fit(&[vec![]], &[1.0]).is_err());
        assert!(LinearRegression::fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]).is_err());
        assert!(LinearRegression::fit(&[vec![f64::NAN]], &[1.0]).is_err());

        let model = LinearRegression::fit(&[vec![1.0], vec![2.0]], &[1.0, 2.0]).unwrap();
        assert!(model.predict_one(&[1.0, 2.0]).is_err());
    }
}
