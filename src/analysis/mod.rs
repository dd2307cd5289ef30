//! Statistical analysis of species–habitat association.
//!
//! ```text
//!   Dataset ──► group_by_habitat ──┬──► contingency   (χ² per species)
//!                                  ├──► occurrence    (rate per habitat × species)
//!                                  ├──► descriptive   (mean / std per habitat)
//!                                  └──► summary       (preferred habitat, from rates)
//! ```
//!
//! The result is built once per run and written verbatim to JSON.

pub mod contingency;
pub mod descriptive;
pub mod occurrence;
pub mod report;
pub mod summary;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::data::filter::group_by_habitat;
use crate::data::model::Dataset;
use crate::error::StatsError;
use contingency::{chi_square_test, ContingencyTable};
use descriptive::HabitatCharacteristics;
use occurrence::{occurrence_rates, OccurrenceRate};
use summary::{preferred_habitats, Preference};

// ---------------------------------------------------------------------------
// OrderedMap – string-keyed map that serializes in insertion order
// ---------------------------------------------------------------------------

/// Insertion-ordered map used wherever report order carries meaning
/// (species column order, habitat first-appearance order).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn insert(&mut self, key: String, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// Independence test outcome for one species.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ContingencyResult {
    /// Observed counts: presence value → habitat → count.
    pub contingency_table: OrderedMap<OrderedMap<u64>>,
    pub chi2_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub significant: bool,
}

impl ContingencyResult {
    fn new(table: &ContingencyTable, species: &str) -> Result<Self, StatsError> {
        let test = chi_square_test(table).map_err(|e| StatsError::IndependenceTest {
            species: species.to_string(),
            source: Box::new(e),
        })?;

        let mut by_presence = OrderedMap::new();
        for (j, col) in table.col_labels.iter().enumerate() {
            let mut by_habitat = OrderedMap::new();
            for (row, counts) in table.row_labels.iter().zip(&table.counts) {
                by_habitat.insert(row.clone(), counts[j]);
            }
            by_presence.insert(col.clone(), by_habitat);
        }

        Ok(Self {
            contingency_table: by_presence,
            chi2_statistic: test.statistic,
            p_value: test.p_value,
            degrees_of_freedom: test.degrees_of_freedom,
            significant: test.is_significant(),
        })
    }
}

/// The complete output of one analysis run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalysisResult {
    pub contingency_analysis: OrderedMap<ContingencyResult>,
    pub occurrence_rates: Vec<OccurrenceRate>,
    pub habitat_characteristics: OrderedMap<HabitatCharacteristics>,
    pub summary: OrderedMap<Preference>,
}

/// Run every analysis over the dataset.
///
/// Any failure aborts the whole analysis; no partial result is returned.
pub fn analyze(dataset: &Dataset) -> Result<AnalysisResult, StatsError> {
    if dataset.is_empty() {
        return Err(StatsError::EmptyDataset);
    }
    if dataset.species().is_empty() {
        return Err(StatsError::NoSpecies);
    }

    let groups = group_by_habitat(dataset);
    debug!(
        "analyzing {} observations in {} habitat types",
        dataset.len(),
        groups.len()
    );

    let mut contingency_analysis = OrderedMap::new();
    for (idx, code) in dataset.species().iter().enumerate() {
        let table = ContingencyTable::habitat_by_presence(&groups, idx);
        let result = ContingencyResult::new(&table, code)?;
        debug!(
            "{code}: chi2 = {:.4}, p = {:.4e}, dof = {}",
            result.chi2_statistic, result.p_value, result.degrees_of_freedom
        );
        contingency_analysis.insert(code.clone(), result);
    }

    let occurrence_rates = occurrence_rates(&groups, dataset.species())?;

    let mut habitat_characteristics = OrderedMap::new();
    for group in &groups {
        habitat_characteristics.insert(
            group.habitat.to_string(),
            HabitatCharacteristics::of(group),
        );
    }

    let summary = preferred_habitats(&occurrence_rates, dataset.species());

    info!(
        "analysis complete: {} species, {} habitat types",
        dataset.species().len(),
        groups.len()
    );

    Ok(AnalysisResult {
        contingency_analysis,
        occurrence_rates,
        habitat_characteristics,
        summary,
    })
}

impl AnalysisResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the pretty-printed JSON report, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = self.to_json().context("serializing analysis results")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("results saved to {}", path.display());
        Ok(())
    }
}
