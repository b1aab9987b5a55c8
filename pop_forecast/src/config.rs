//! Parameters for a comparison run

use crate::error::Result;
use crate::features::check_lag_order;
use crate::models::linear::default_candidates;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Parameters shared by the evaluators of one comparison run.
///
/// Missing fields in a config file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// First year of the test period
    pub test_start_year: i32,
    /// Lag order of the feature table and the AR model
    pub n_lags: usize,
    /// First year of the baseline growth estimation window
    pub start_year_for_growth: i32,
    /// Years projected past the end of the series by the baseline
    pub horizon: usize,
    /// Highest AR order of the lag sensitivity sweep
    pub max_lag: usize,
    /// Candidate columns for the linear model
    pub linear_features: Vec<String>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            test_start_year: 2000,
            n_lags: 2,
            start_year_for_growth: 1980,
            horizon: 20,
            max_lag: 5,
            linear_features: default_candidates(),
        }
    }
}

impl ComparisonConfig {
    /// Read a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the lag orders lie in `1..=MAX_LAG_ORDER`
    pub fn validate(&self) -> Result<()> {
        check_lag_order("n_lags", self.n_lags)?;
        check_lag_order("max_lag", self.max_lag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;
    use crate::features::MAX_LAG_ORDER;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ComparisonConfig::default();
        assert_eq!(config.test_start_year, 2000);
        assert_eq!(config.n_lags, 2);
        assert_eq!(config.start_year_for_growth, 1980);
        assert_eq!(config.horizon, 20);
        assert_eq!(config.max_lag, 5);
        assert_eq!(
            config.linear_features,
            vec!["population_total", "growth_rate", "pop_lag_1", "pop_lag_2"]
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"test_start_year": 2010, "n_lags": 3}}"#).unwrap();

        let config = ComparisonConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.test_start_year, 2010);
        assert_eq!(config.n_lags, 3);
        assert_eq!(config.max_lag, 5);
    }

    #[test]
    fn test_invalid_lag_orders() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"n_lags": 0}}"#).unwrap();
        assert!(matches!(
            ComparisonConfig::from_json_file(file.path()),
            Err(ForecastError::InvalidParameter(_))
        ));

        let config = ComparisonConfig {
            max_lag: 0,
            ..ComparisonConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_lag_orders() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"n_lags": 18446744073709551615}}"#).unwrap();
        match ComparisonConfig::from_json_file(file.path()) {
            Err(ForecastError::InvalidParameter(msg)) => assert!(msg.contains("n_lags")),
            other => panic!("expected an invalid parameter, got {:?}", other),
        }

        let config = ComparisonConfig {
            max_lag: MAX_LAG_ORDER + 1,
            ..ComparisonConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ComparisonConfig {
            n_lags: MAX_LAG_ORDER,
            max_lag: MAX_LAG_ORDER,
            ..ComparisonConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
