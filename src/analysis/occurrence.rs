use serde::{Deserialize, Serialize};

use crate::data::filter::HabitatGroup;
use crate::error::StatsError;

/// Occurrence of one species in one habitat type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceRate {
    pub species: String,
    pub water_body_type: String,
    pub occurrences: usize,
    pub n_observations: usize,
    /// Percentage in [0, 100].
    pub occurrence_rate: f64,
}

/// `occurrences / n × 100`; `n` must be non-zero.
pub fn percentage(occurrences: usize, n: usize, habitat: &str) -> Result<f64, StatsError> {
    if n == 0 {
        return Err(StatsError::EmptyHabitat {
            habitat: habitat.to_string(),
        });
    }
    Ok(occurrences as f64 / n as f64 * 100.0)
}

/// Occurrence rates for every (habitat, species) pair, habitat-major in
/// group order, species-minor in column order.
pub fn occurrence_rates(
    groups: &[HabitatGroup<'_>],
    species: &[String],
) -> Result<Vec<OccurrenceRate>, StatsError> {
    let mut rates = Vec::with_capacity(groups.len() * species.len());
    for group in groups {
        let n = group.len();
        for (idx, code) in species.iter().enumerate() {
            let occurrences = group.occurrences(idx);
            rates.push(OccurrenceRate {
                species: code.clone(),
                water_body_type: group.habitat.to_string(),
                occurrences,
                n_observations: n,
                occurrence_rate: percentage(occurrences, n, group.habitat)?,
            });
        }
    }
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::group_by_habitat;
    use crate::data::model::{Dataset, Observation};

    #[test]
    fn rates_are_habitat_major() {
        let rows = [("a", [1u8, 0]), ("a", [1, 1]), ("b", [0, 1]), ("a", [0, 0])];
        let observations = rows
            .iter()
            .enumerate()
            .map(|(i, (h, p))| Observation {
                id: i as u64 + 1,
                habitat: h.to_string(),
                covariates: [0.0, 7.0, 10.0, 8.0],
                presence: p.to_vec(),
            })
            .collect();
        let ds = Dataset::new(vec!["X".into(), "Y".into()], observations).unwrap();
        let rates = occurrence_rates(&group_by_habitat(&ds), ds.species()).unwrap();

        let keys: Vec<(&str, &str)> = rates
            .iter()
            .map(|r| (r.water_body_type.as_str(), r.species.as_str()))
            .collect();
        assert_eq!(keys, [("a", "X"), ("a", "Y"), ("b", "X"), ("b", "Y")]);

        assert_eq!(rates[0].occurrences, 2);
        assert_eq!(rates[0].n_observations, 3);
        assert!((rates[0].occurrence_rate - 200.0 / 3.0).abs() < 1e-12);
        assert_eq!(rates[3].occurrence_rate, 100.0);
        assert_eq!(rates[2].occurrence_rate, 0.0);
    }

    #[test]
    fn zero_denominator_is_an_error() {
        assert!(matches!(
            percentage(0, 0, "dry"),
            Err(StatsError::EmptyHabitat { habitat }) if habitat == "dry"
        ));
    }
}
