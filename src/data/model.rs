use std::collections::HashSet;
use std::fmt;

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Covariate – one continuous environmental measurement
// ---------------------------------------------------------------------------

/// The continuous environmental measurements recorded for every observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Covariate {
    Salinity,
    Ph,
    Temperature,
    DissolvedOxygen,
}

impl Covariate {
    /// All covariates in column order.
    pub const ALL: [Covariate; 4] = [
        Covariate::Salinity,
        Covariate::Ph,
        Covariate::Temperature,
        Covariate::DissolvedOxygen,
    ];

    /// Position inside [`Observation::covariates`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name in the dataset CSV.
    pub fn column(self) -> &'static str {
        match self {
            Covariate::Salinity => "salinity_ppt",
            Covariate::Ph => "pH",
            Covariate::Temperature => "temperature_C",
            Covariate::DissolvedOxygen => "dissolved_oxygen_mg_L",
        }
    }

    /// Prefix of the `<key>_mean` / `<key>_std` entries in the report.
    pub fn key(self) -> &'static str {
        match self {
            Covariate::Salinity => "salinity",
            Covariate::Ph => "pH",
            Covariate::Temperature => "temperature",
            Covariate::DissolvedOxygen => "dissolved_oxygen",
        }
    }

    /// Human-readable label with unit, used on chart axes.
    pub fn label(self) -> &'static str {
        match self {
            Covariate::Salinity => "Salinity (ppt)",
            Covariate::Ph => "pH",
            Covariate::Temperature => "Temperature (°C)",
            Covariate::DissolvedOxygen => "Dissolved Oxygen (mg/L)",
        }
    }

    /// Closed interval generated values are clipped to.
    pub fn range(self) -> (f64, f64) {
        match self {
            Covariate::Salinity => (0.0, 40.0),
            Covariate::Ph => (6.0, 9.0),
            Covariate::Temperature => (0.0, 35.0),
            Covariate::DissolvedOxygen => (2.0, 12.0),
        }
    }

    pub fn clip(self, value: f64) -> f64 {
        let (lo, hi) = self.range();
        value.clamp(lo, hi)
    }
}

impl fmt::Display for Covariate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column name holding the presence indicator of `species`.
pub fn presence_column(species: &str) -> String {
    format!("{species}_present")
}

// ---------------------------------------------------------------------------
// Observation – one row of the table
// ---------------------------------------------------------------------------

/// A single sampled event.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// 1-based identifier, unique within a dataset.
    pub id: u64,
    /// Habitat-type label.
    pub habitat: String,
    /// Covariate values indexed by [`Covariate::index`].
    pub covariates: [f64; 4],
    /// Presence indicator per species, aligned with [`Dataset::species`].
    pub presence: Vec<u8>,
}

impl Observation {
    pub fn covariate(&self, covariate: Covariate) -> f64 {
        self.covariates[covariate.index()]
    }

    pub fn is_present(&self, species: usize) -> bool {
        self.presence.get(species).is_some_and(|&p| p == 1)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete, immutable table
// ---------------------------------------------------------------------------

/// The full observation table with its species list and habitat order.
///
/// Habitats are listed in order of first appearance in the rows. Every
/// per-habitat iteration downstream (including the preferred-habitat
/// tie-break) follows this order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    species: Vec<String>,
    observations: Vec<Observation>,
    habitats: Vec<String>,
}

impl Dataset {
    /// Build a dataset, checking that every row carries exactly one 0/1
    /// indicator per species.
    pub fn new(species: Vec<String>, observations: Vec<Observation>) -> Result<Self, DataError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut habitats = Vec::new();

        for obs in &observations {
            if obs.presence.len() != species.len() {
                return Err(DataError::PresenceArity {
                    id: obs.id,
                    expected: species.len(),
                    got: obs.presence.len(),
                });
            }
            if let Some(&value) = obs.presence.iter().find(|&&p| p > 1) {
                return Err(DataError::NonBinaryPresence { id: obs.id, value });
            }
            if seen.insert(obs.habitat.as_str()) {
                habitats.push(obs.habitat.clone());
            }
        }

        Ok(Dataset {
            species,
            observations,
            habitats,
        })
    }

    /// Species codes, in column order.
    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Habitat labels in first-appearance order.
    pub fn habitats(&self) -> &[String] {
        &self.habitats
    }

    pub fn species_index(&self, code: &str) -> Option<usize> {
        self.species.iter().position(|s| s == code)
    }

    /// Number of observations where `species` is present.
    pub fn presence_total(&self, species: usize) -> usize {
        self.observations
            .iter()
            .filter(|o| o.is_present(species))
            .count()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
