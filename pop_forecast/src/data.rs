//! Yearly population series and the providers that supply them

use crate::error::{ForecastError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Total population observed in one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    pub population_total: f64,
}

impl YearRecord {
    pub fn new(year: i32, population_total: f64) -> Self {
        Self {
            year,
            population_total,
        }
    }
}

/// Validated yearly population series.
///
/// Years are strictly increasing and every population is finite and positive.
/// The series is read-only once built; transforms produce new values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySeries {
    records: Vec<YearRecord>,
}

impl YearlySeries {
    /// Build a series from records in any order.
    ///
    /// Records are sorted by year; duplicate years and non-positive or
    /// non-finite populations are rejected.
    pub fn new(mut records: Vec<YearRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.year);

        if let Some(w) = records.windows(2).find(|w| w[0].year == w[1].year) {
            return Err(ForecastError::DataError(format!(
                "Duplicate year {} in population series",
                w[0].year
            )));
        }

        if let Some(r) = records
            .iter()
            .find(|r| !(r.population_total.is_finite() && r.population_total > 0.0))
        {
            return Err(ForecastError::DataError(format!(
                "Population for year {} must be positive and finite, got {}",
                r.year, r.population_total
            )));
        }

        Ok(Self { records })
    }

    /// Build a series from `(year, population_total)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(year, population_total)| YearRecord::new(year, population_total))
                .collect(),
        )
    }

    pub fn records(&self) -> &[YearRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    pub fn populations(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.population_total).collect()
    }

    pub fn first(&self) -> Option<&YearRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&YearRecord> {
        self.records.last()
    }

    /// Copy of the records with `start <= year <= end`; `None` leaves a side open
    pub fn window(&self, start: Option<i32>, end: Option<i32>) -> YearlySeries {
        let records = self
            .records
            .iter()
            .filter(|r| start.map_or(true, |s| r.year >= s))
            .filter(|r| end.map_or(true, |e| r.year <= e))
            .copied()
            .collect();

        YearlySeries { records }
    }
}

/// Source of the yearly population series
pub trait SeriesProvider {
    /// Return the normalized series, one row per year
    fn load(&self) -> Result<YearlySeries>;
}

impl SeriesProvider for YearlySeries {
    fn load(&self) -> Result<YearlySeries> {
        Ok(self.clone())
    }
}

/// Loads a yearly series from a delimited file with a header row.
///
/// Rows can be restricted to one breakdown (for example sex = total and
/// age = total) with equality filters. When a year appears more than once
/// after filtering, the first row wins.
#[derive(Debug, Clone)]
pub struct CsvSeriesProvider {
    path: PathBuf,
    year_column: String,
    value_column: String,
    filters: Vec<(String, String)>,
}

impl CsvSeriesProvider {
    /// Read `year` and `population_total` columns from `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            year_column: "year".to_string(),
            value_column: "population_total".to_string(),
            filters: Vec::new(),
        }
    }

    /// Use different column names for the year and the population value
    pub fn with_columns(mut self, year_column: &str, value_column: &str) -> Self {
        self.year_column = year_column.to_string();
        self.value_column = value_column.to_string();
        self
    }

    /// Keep only rows where `column` equals `value`
    pub fn with_filter(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeriesProvider for CsvSeriesProvider {
    fn load(&self) -> Result<YearlySeries> {
        let file = File::open(&self.path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        series_from_dataframe(&df, &self.year_column, &self.value_column, &self.filters)
    }
}

/// Extract a yearly series from a DataFrame.
///
/// `filters` are `(column, value)` pairs compared as text.
pub fn series_from_dataframe(
    df: &DataFrame,
    year_column: &str,
    value_column: &str,
    filters: &[(String, String)],
) -> Result<YearlySeries> {
    let mut keep = vec![true; df.height()];

    for (column, expected) in filters {
        let text = required_column(df, column)?.cast(&DataType::Utf8)?;
        for (flag, value) in keep.iter_mut().zip(text.utf8()?.into_iter()) {
            if value.map(str::trim) != Some(expected.as_str()) {
                *flag = false;
            }
        }
    }

    let years = required_column(df, year_column)?.cast(&DataType::Int64)?;
    let values = required_column(df, value_column)?.cast(&DataType::Float64)?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (row, ((flag, year), value)) in keep
        .into_iter()
        .zip(years.i64()?.into_iter())
        .zip(values.f64()?.into_iter())
        .enumerate()
    {
        if !flag {
            continue;
        }

        let year = year.ok_or_else(|| {
            ForecastError::DataError(format!("Missing or non-numeric year in row {}", row))
        })?;
        let year = i32::try_from(year)
            .map_err(|_| ForecastError::DataError(format!("Year {} out of range", year)))?;
        let value = value.ok_or_else(|| {
            ForecastError::DataError(format!("Missing population value for year {}", year))
        })?;

        if seen.insert(year) {
            records.push(YearRecord::new(year, value));
        }
    }

    debug!(
        rows = df.height(),
        kept = records.len(),
        "extracted yearly population series"
    );

    YearlySeries::new(records)
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name).map_err(|_| {
        ForecastError::DataShape(format!(
            "Column '{}' not found; available columns: {:?}",
            name,
            df.get_column_names()
        ))
    })
}
