//! SeriesLayout: which source columns are read and how they group into subplots.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TracerError;

/// Ordered subplot groups of 1-based source column indices.
///
/// The textual form separates columns of a subplot with commas and subplots
/// with slashes: `"1,2/3"` reads columns 1 and 2 into the first subplot and
/// column 3 into the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeriesLayout {
    groups: Vec<Vec<usize>>,
}

impl SeriesLayout {
    /// Build a layout from explicit groups. Every group must be non-empty and
    /// every index at least 1.
    pub fn new(groups: Vec<Vec<usize>>) -> Result<Self, TracerError> {
        if groups.is_empty() || groups.iter().any(|g| g.is_empty()) {
            return Err(TracerError::Config(
                "columns list must not contain empty subplots".to_string(),
            ));
        }
        if groups.iter().flatten().any(|&c| c == 0) {
            return Err(TracerError::Config(
                "column indices start at 1".to_string(),
            ));
        }
        Ok(Self { groups })
    }

    /// A single subplot holding the given columns (used after inference).
    pub(crate) fn single(columns: Vec<usize>) -> Self {
        Self {
            groups: vec![columns],
        }
    }

    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    pub fn subplot_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of active columns (K).
    pub fn column_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Highest source index any line must provide.
    pub fn max_index(&self) -> usize {
        self.groups.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Source indices in store order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.iter().flatten().copied()
    }

    /// Store positions covered by each subplot group.
    pub fn group_ranges(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.groups
            .iter()
            .map(|g| {
                let r = start..start + g.len();
                start = r.end;
                r
            })
            .collect()
    }
}

impl FromStr for SeriesLayout {
    type Err = TracerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            TracerError::Config(format!(
                "invalid columns list: '{s}': must be integers separated by commas or slashes"
            ))
        };
        let mut groups = Vec::new();
        for subplot in s.split('/') {
            let mut group = Vec::new();
            for column in subplot.split(',') {
                let idx: usize = column.trim().parse().map_err(|_| invalid())?;
                if idx == 0 {
                    return Err(invalid());
                }
                group.push(idx);
            }
            groups.push(group);
        }
        Self::new(groups)
    }
}

impl TryFrom<String> for SeriesLayout {
    type Error = TracerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SeriesLayout> for String {
    fn from(layout: SeriesLayout) -> Self {
        layout.to_string()
    }
}

impl fmt::Display for SeriesLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .groups
            .iter()
            .map(|g| {
                g.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("/");
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subplots_and_columns() {
        let layout: SeriesLayout = "1,3/2".parse().unwrap();
        assert_eq!(layout.groups(), &[vec![1, 3], vec![2]]);
        assert_eq!(layout.column_count(), 3);
        assert_eq!(layout.max_index(), 3);
        assert_eq!(layout.group_ranges(), vec![0..2, 2..3]);
        assert_eq!(layout.to_string(), "1,3/2");
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!("0,1".parse::<SeriesLayout>().is_err());
        assert!("1,,2".parse::<SeriesLayout>().is_err());
        assert!("a".parse::<SeriesLayout>().is_err());
    }
}
