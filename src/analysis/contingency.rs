//! Chi-square test of independence on a habitat × presence table.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::data::filter::HabitatGroup;
use crate::error::StatsError;

/// Fixed significance threshold of the independence test.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Column labels of the presence dimension.
pub const PRESENCE_LABELS: [&str; 2] = ["0", "1"];

/// An r × c table of observed counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// `counts[row][col]`.
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Cross-tabulate habitat (rows, in group order) against the presence
    /// of one species (columns: absent, present).
    pub fn habitat_by_presence(groups: &[HabitatGroup<'_>], species: usize) -> Self {
        let counts = groups
            .iter()
            .map(|g| {
                let present = g.occurrences(species) as u64;
                vec![g.len() as u64 - present, present]
            })
            .collect();
        ContingencyTable {
            row_labels: groups.iter().map(|g| g.habitat.to_string()).collect(),
            col_labels: PRESENCE_LABELS.iter().map(|s| s.to_string()).collect(),
            counts,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        (0..self.col_labels.len())
            .map(|j| self.counts.iter().map(|r| r[j]).sum())
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.row_totals().iter().sum()
    }

    /// Expected counts under independence: `row_total × col_total / n`.
    pub fn expected(&self) -> Vec<Vec<f64>> {
        let n = self.total() as f64;
        let cols = self.col_totals();
        self.row_totals()
            .iter()
            .map(|&r| cols.iter().map(|&c| r as f64 * c as f64 / n).collect())
            .collect()
    }
}

/// Outcome of [`chi_square_test`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub expected: Vec<Vec<f64>>,
}

impl ChiSquareTest {
    pub fn is_significant(&self) -> bool {
        self.p_value < SIGNIFICANCE_LEVEL
    }
}

/// Pearson chi-square test of independence.
///
/// Fails when the table is degenerate: fewer than two rows or columns, or
/// an empty row or column (which makes an expected frequency zero). With
/// one degree of freedom Yates' continuity correction is applied.
pub fn chi_square_test(table: &ContingencyTable) -> Result<ChiSquareTest, StatsError> {
    let (rows, cols) = table.shape();
    if rows < 2 || cols < 2 {
        return Err(StatsError::DegenerateTable(format!(
            "need at least 2 × 2 cells, got {rows} × {cols}"
        )));
    }
    if let Some(i) = table.row_totals().iter().position(|&t| t == 0) {
        return Err(StatsError::DegenerateTable(format!(
            "row '{}' has no observations",
            table.row_labels[i]
        )));
    }
    if let Some(j) = table.col_totals().iter().position(|&t| t == 0) {
        return Err(StatsError::DegenerateTable(format!(
            "column '{}' is empty in every row",
            table.col_labels[j]
        )));
    }

    let dof = (rows - 1) * (cols - 1);
    let expected = table.expected();
    let yates = dof == 1;

    let mut statistic = 0.0;
    for (observed_row, expected_row) in table.counts.iter().zip(&expected) {
        for (&o, &e) in observed_row.iter().zip(expected_row) {
            let mut diff = (o as f64 - e).abs();
            if yates {
                diff = (diff - 0.5).max(0.0);
            }
            statistic += diff * diff / e;
        }
    }

    let dist = ChiSquared::new(dof as f64).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p_value = dist.sf(statistic).clamp(0.0, 1.0);

    Ok(ChiSquareTest {
        statistic,
        p_value,
        degrees_of_freedom: dof,
        expected,
    })
}
