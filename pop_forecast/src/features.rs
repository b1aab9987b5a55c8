//! Supervised-learning table built from a yearly series
//!
//! Each row pairs the population of year `t` with its growth rate, the
//! populations of the `k` preceding years and the population of year `t + 1`
//! as the prediction target.

use crate::data::YearlySeries;
use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Column holding the population of the row's year
pub const POPULATION_TOTAL: &str = "population_total";
/// Column holding the relative change from the previous year
pub const GROWTH_RATE: &str = "growth_rate";
/// Column holding the following year's population
pub const TARGET_POP_NEXT: &str = "target_pop_next";

const LAG_PREFIX: &str = "pop_lag_";

/// Highest accepted lag order
pub const MAX_LAG_ORDER: usize = 100;

/// Fail unless `1 <= value <= MAX_LAG_ORDER`; `name` labels the error
pub fn check_lag_order(name: &str, value: usize) -> Result<()> {
    if !(1..=MAX_LAG_ORDER).contains(&value) {
        return Err(ForecastError::InvalidParameter(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_LAG_ORDER, value
        )));
    }
    Ok(())
}

/// Name of the column holding the population `k` years back
pub fn lag_column(k: usize) -> String {
    format!("{}{}", LAG_PREFIX, k)
}

/// Lag order `k` of a column named exactly `pop_lag_k` with `k >= 1`
fn lag_order(name: &str) -> Option<usize> {
    let digits = name.strip_prefix(LAG_PREFIX)?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// One fully-defined row of the feature table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub year: i32,
    pub population_total: f64,
    pub growth_rate: f64,
    /// `lags[i]` is the population `i + 1` years before `year`
    pub lags: Vec<f64>,
    pub target_pop_next: f64,
}

impl FeatureRow {
    /// Population `k` years back (1-based)
    pub fn lag(&self, k: usize) -> Option<f64> {
        k.checked_sub(1).and_then(|i| self.lags.get(i)).copied()
    }

    /// Look up a value by column name
    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            POPULATION_TOTAL => Some(self.population_total),
            GROWTH_RATE => Some(self.growth_rate),
            TARGET_POP_NEXT => Some(self.target_pop_next),
            other => lag_order(other).and_then(|k| self.lag(k)),
        }
    }
}

/// Feature rows together with the lag order they were built with
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
    n_lags: usize,
}

impl FeatureTable {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn n_lags(&self) -> usize {
        self.n_lags
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![POPULATION_TOTAL.to_string(), GROWTH_RATE.to_string()];
        names.extend((1..=self.n_lags).map(lag_column));
        names.push(TARGET_POP_NEXT.to_string());
        names
    }

    /// Whether `name` is a column of this table, lag columns included
    pub fn has_column(&self, name: &str) -> bool {
        match name {
            POPULATION_TOTAL | GROWTH_RATE | TARGET_POP_NEXT => true,
            other => lag_order(other).map_or(false, |k| k <= self.n_lags),
        }
    }
}

/// Turn a yearly series into a supervised feature table with `n_lags` lags.
///
/// Rows whose growth rate, lags or next-year target would reach outside the
/// series are dropped, so a series of length `L` yields `L - n_lags - 1` rows.
pub fn build_features(series: &YearlySeries, n_lags: usize) -> Result<FeatureTable> {
    check_lag_order("n_lags", n_lags)?;

    // YearlySeries keeps its records sorted, so positions follow the years
    let records = series.records();
    if n_lags >= records.len() {
        return Ok(FeatureTable {
            rows: Vec::new(),
            n_lags,
        });
    }
    let mut rows = Vec::with_capacity(records.len() - n_lags - 1);

    // n_lags >= 1 also guarantees the previous year exists for the growth rate
    for t in n_lags..records.len().saturating_sub(1) {
        let population_total = records[t].population_total;

        rows.push(FeatureRow {
            year: records[t].year,
            population_total,
            growth_rate: population_total / records[t - 1].population_total - 1.0,
            lags: (1..=n_lags).map(|k| records[t - k].population_total).collect(),
            target_pop_next: records[t + 1].population_total,
        });
    }

    Ok(FeatureTable { rows, n_lags })
}
