use serde::ser::{Serialize, SerializeMap, Serializer};
use statrs::statistics::Statistics;

use crate::data::filter::HabitatGroup;
use crate::data::model::Covariate;

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.mean()
}

/// Sample standard deviation with the n − 1 divisor.
///
/// Undefined (NaN) for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    values.std_dev()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovariateSummary {
    pub mean: f64,
    pub std_dev: f64,
}

impl CovariateSummary {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            std_dev: sample_std(values),
        }
    }
}

/// Mean and standard deviation of every covariate within one habitat.
///
/// Serializes as a flat map `salinity_mean, salinity_std, pH_mean, …`;
/// NaN values come out as JSON `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitatCharacteristics {
    pub summaries: [CovariateSummary; 4],
}

impl HabitatCharacteristics {
    pub fn of(group: &HabitatGroup<'_>) -> Self {
        Self {
            summaries: Covariate::ALL
                .map(|c| CovariateSummary::from_values(&group.covariate_values(c))),
        }
    }

    pub fn get(&self, covariate: Covariate) -> CovariateSummary {
        self.summaries[covariate.index()]
    }
}

impl Serialize for HabitatCharacteristics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 * Covariate::ALL.len()))?;
        for c in Covariate::ALL {
            let summary = self.get(c);
            map.serialize_entry(&format!("{}_mean", c.key()), &finite(summary.mean))?;
            map.serialize_entry(&format!("{}_std", c.key()), &finite(summary.std_dev))?;
        }
        map.end()
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_uses_n_minus_one() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        // Population std is 2; sample std is sqrt(32 / 7).
        assert!((sample_std(&values) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_undefined_std() {
        assert_eq!(mean(&[3.5]), 3.5);
        assert!(sample_std(&[3.5]).is_nan());
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn serializes_flat_keys_with_null_for_nan() {
        let hc = HabitatCharacteristics {
            summaries: [
                CovariateSummary { mean: 0.5, std_dev: f64::NAN },
                CovariateSummary { mean: 7.0, std_dev: 0.25 },
                CovariateSummary { mean: 12.0, std_dev: 3.0 },
                CovariateSummary { mean: 9.0, std_dev: 1.0 },
            ],
        };
        let json = serde_json::to_value(&hc).unwrap();
        assert_eq!(json["salinity_mean"], 0.5);
        assert!(json["salinity_std"].is_null());
        assert_eq!(json["pH_std"], 0.25);
        assert_eq!(json["dissolved_oxygen_mean"], 9.0);
        assert_eq!(json.as_object().unwrap().len(), 8);
    }
}
