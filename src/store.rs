//! SeriesStore: per-column accumulated values with band trimming.

use std::collections::VecDeque;

use crate::error::TracerError;

/// Immutable deep copy of the store at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub count: usize,
    pub columns: Vec<Vec<f64>>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Values of one record across all columns.
    pub fn record(&self, i: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().map(move |c| c[i])
    }
}

/// Column-major buffer of `f64` samples, one `VecDeque` per active column.
///
/// All columns always have the same length: `append` either pushes one value
/// to every column or fails without touching anything.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    columns: Vec<VecDeque<f64>>,
}

impl SeriesStore {
    pub fn new(column_count: usize) -> Self {
        Self {
            columns: vec![VecDeque::new(); column_count],
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, i: usize) -> Option<&VecDeque<f64>> {
        self.columns.get(i)
    }

    pub fn append(&mut self, values: &[f64]) -> Result<(), TracerError> {
        if values.len() != self.columns.len() {
            return Err(TracerError::ShapeMismatch {
                expected: self.columns.len(),
                got: values.len(),
            });
        }
        for (col, &v) in self.columns.iter_mut().zip(values) {
            col.push_back(v);
        }
        Ok(())
    }

    /// Drop the oldest records so that at most `band` remain. Returns how
    /// many records were removed.
    pub fn trim_to_band(&mut self, band: Option<usize>) -> usize {
        let Some(band) = band else {
            return 0;
        };
        let excess = self.len().saturating_sub(band);
        if excess > 0 {
            for col in self.columns.iter_mut() {
                col.drain(..excess);
            }
        }
        excess
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            count: self.len(),
            columns: self
                .columns
                .iter()
                .map(|c| c.iter().copied().collect())
                .collect(),
        }
    }
}
