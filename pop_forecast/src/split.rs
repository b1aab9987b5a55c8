//! Chronological train/test split

use crate::data::YearRecord;
use crate::error::{ForecastError, Result};
use crate::features::FeatureRow;

/// Anything carrying the year it describes
pub trait Dated {
    fn year(&self) -> i32;
}

impl Dated for YearRecord {
    fn year(&self) -> i32 {
        self.year
    }
}

impl Dated for FeatureRow {
    fn year(&self) -> i32 {
        self.year
    }
}

/// Rows before the cutoff year (`train`) and from the cutoff on (`test`)
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

impl<T> Split<T> {
    pub fn train_size(&self) -> usize {
        self.train.len()
    }

    pub fn test_size(&self) -> usize {
        self.test.len()
    }

    /// True when either side has no rows
    pub fn is_degenerate(&self) -> bool {
        self.train.is_empty() || self.test.is_empty()
    }

    /// Fail with [`ForecastError::EmptySplit`] when either side is empty
    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.is_degenerate() {
            return Err(ForecastError::EmptySplit {
                train_size: self.train.len(),
                test_size: self.test.len(),
            });
        }
        Ok(())
    }
}

/// Partition rows on `test_start_year`, keeping their relative order.
///
/// The rows are copied, so each caller owns its own view of the data.
pub fn chronological_split<T: Dated + Clone>(rows: &[T], test_start_year: i32) -> Split<T> {
    let (train, test): (Vec<T>, Vec<T>) = rows
        .iter()
        .cloned()
        .partition(|row| row.year() < test_start_year);

    Split { train, test }
}
