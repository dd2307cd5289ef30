use std::collections::HashMap;

use super::model::{Covariate, Dataset, Observation};

// ---------------------------------------------------------------------------
// Habitat grouping
// ---------------------------------------------------------------------------

/// The observations of one habitat type, borrowed from the dataset.
#[derive(Debug, Clone)]
pub struct HabitatGroup<'a> {
    pub habitat: &'a str,
    pub observations: Vec<&'a Observation>,
}

impl<'a> HabitatGroup<'a> {
    /// Number of observations in the group.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations in this habitat where `species` is present.
    pub fn occurrences(&self, species: usize) -> usize {
        self.observations
            .iter()
            .filter(|o| o.is_present(species))
            .count()
    }

    /// Observations where both species are present. With `a == b` this is
    /// the marginal count of that species.
    pub fn co_occurrences(&self, a: usize, b: usize) -> usize {
        self.observations
            .iter()
            .filter(|o| o.is_present(a) && o.is_present(b))
            .count()
    }

    /// All values of one covariate, in row order.
    pub fn covariate_values(&self, covariate: Covariate) -> Vec<f64> {
        self.observations
            .iter()
            .map(|o| o.covariate(covariate))
            .collect()
    }
}

/// Partition the dataset by habitat, in first-appearance order.
///
/// Row order inside each group is preserved.
pub fn group_by_habitat(dataset: &Dataset) -> Vec<HabitatGroup<'_>> {
    let position: HashMap<&str, usize> = dataset
        .habitats()
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let mut groups: Vec<HabitatGroup<'_>> = dataset
        .habitats()
        .iter()
        .map(|h| HabitatGroup {
            habitat: h.as_str(),
            observations: Vec::new(),
        })
        .collect();

    for obs in dataset.observations() {
        // Every habitat label was registered when the dataset was built.
        if let Some(&i) = position.get(obs.habitat.as_str()) {
            groups[i].observations.push(obs);
        }
    }
    groups
}
