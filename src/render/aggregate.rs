//! Chart-ready aggregates, computed once from the dataset.

use std::cmp::Ordering;

use crate::analysis::occurrence::percentage;
use crate::data::filter::group_by_habitat;
use crate::data::model::{Covariate, Dataset};
use crate::error::StatsError;

/// Quantile of already sorted values, linear interpolation between ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let idx = q * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let t = idx - lo as f64;
        sorted[lo] * (1.0 - t) + sorted[hi] * t
    }
}

/// Five-number box summary with 1.5 × IQR whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value not below `q1 - 1.5 IQR`.
    pub whisker_low: f64,
    /// Largest value not above `q3 + 1.5 IQR`.
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = sorted.iter().copied().filter(|&v| v >= lo_fence && v <= hi_fence);
        let whisker_low = inside.clone().fold(f64::INFINITY, f64::min).min(q1);
        let whisker_high = inside.fold(f64::NEG_INFINITY, f64::max).max(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lo_fence || v > hi_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// Lowest and highest drawn point, outliers included.
    pub fn extent(&self) -> (f64, f64) {
        let lo = self.outliers.iter().copied().fold(self.whisker_low, f64::min);
        let hi = self.outliers.iter().copied().fold(self.whisker_high, f64::max);
        (lo, hi)
    }
}

/// Everything the charts draw, indexed by habitat (first-appearance order)
/// and species (column order).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub habitats: Vec<String>,
    pub species: Vec<String>,
    /// `rates[habitat][species]`, percent.
    pub rates: Vec<Vec<f64>>,
    /// `counts[habitat][species]`, observations with the species present.
    pub counts: Vec<Vec<usize>>,
    /// `boxes[covariate][habitat]`.
    pub boxes: Vec<Vec<Option<BoxSummary>>>,
    /// `co_occurrence[habitat][a][b]`; the diagonal holds marginal counts.
    pub co_occurrence: Vec<Vec<Vec<usize>>>,
}

impl ChartData {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, StatsError> {
        if dataset.is_empty() {
            return Err(StatsError::EmptyDataset);
        }
        let groups = group_by_habitat(dataset);
        let n_species = dataset.species().len();

        let mut rates = Vec::with_capacity(groups.len());
        let mut counts = Vec::with_capacity(groups.len());
        let mut co_occurrence = Vec::with_capacity(groups.len());
        for group in &groups {
            let row: Vec<usize> = (0..n_species).map(|s| group.occurrences(s)).collect();
            rates.push(
                row.iter()
                    .map(|&c| percentage(c, group.len(), group.habitat))
                    .collect::<Result<Vec<_>, _>>()?,
            );
            counts.push(row);
            co_occurrence.push(
                (0..n_species)
                    .map(|a| (0..n_species).map(|b| group.co_occurrences(a, b)).collect())
                    .collect(),
            );
        }

        let boxes = Covariate::ALL
            .iter()
            .map(|&c| {
                groups
                    .iter()
                    .map(|g| BoxSummary::from_values(&g.covariate_values(c)))
                    .collect()
            })
            .collect();

        Ok(Self {
            habitats: dataset.habitats().to_vec(),
            species: dataset.species().to_vec(),
            rates,
            counts,
            boxes,
            co_occurrence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 1.0), 4.0);
        assert!((quantile(&v, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&v, 0.25) - 1.75).abs() < 1e-12);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn box_summary_separates_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let b = BoxSummary::from_values(&values).unwrap();
        assert_eq!(b.median, 5.0);
        assert_eq!(b.q1, 3.0);
        assert_eq!(b.q3, 7.0);
        assert_eq!(b.whisker_low, 1.0);
        assert_eq!(b.whisker_high, 8.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.extent(), (1.0, 100.0));
    }

    #[test]
    fn box_summary_of_single_value() {
        let b = BoxSummary::from_values(&[4.2]).unwrap();
        assert_eq!((b.q1, b.median, b.q3), (4.2, 4.2, 4.2));
        assert!(b.outliers.is_empty());
        assert!(BoxSummary::from_values(&[]).is_none());
    }

    #[test]
    fn chart_data_matches_dataset() {
        let rows = [("a", [1u8, 1]), ("a", [1, 0]), ("b", [0, 1]), ("b", [1, 1])];
        let observations = rows
            .iter()
            .enumerate()
            .map(|(i, (h, p))| Observation {
                id: i as u64 + 1,
                habitat: h.to_string(),
                covariates: [0.1 * i as f64, 7.0, 10.0, 8.0],
                presence: p.to_vec(),
            })
            .collect();
        let ds = Dataset::new(vec!["X".into(), "Y".into()], observations).unwrap();
        let data = ChartData::from_dataset(&ds).unwrap();

        assert_eq!(data.habitats, ["a", "b"]);
        assert_eq!(data.counts, vec![vec![2, 1], vec![1, 2]]);
        assert_eq!(data.rates, vec![vec![100.0, 50.0], vec![50.0, 100.0]]);
        assert_eq!(data.co_occurrence[0], vec![vec![2, 1], vec![1, 1]]);
        assert_eq!(data.co_occurrence[1], vec![vec![1, 1], vec![1, 2]]);
        assert_eq!(data.boxes.len(), 4);
        assert_eq!(data.boxes[0].len(), 2);
    }
}
