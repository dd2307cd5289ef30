//! Survey configuration: habitat profiles, species, seed and output paths.
//!
//! Every field has a default, so a run without a config file uses the
//! built-in three-habitat survey. A TOML file overrides any subset:
//!
//! ```toml
//! seed = 7
//! samples = 300
//! species = ["RGS", "RES", "PH"]
//!
//! [paths]
//! plots = "out/plots"
//!
//! [[habitats]]
//! name = "Clear spring fed pond"
//! salinity = { mean = 0.2, std_dev = 0.1 }
//! ph = { mean = 7.4, std_dev = 0.3 }
//! temperature = { mean = 12.0, std_dev = 3.0 }
//! dissolved_oxygen = { mean = 9.0, std_dev = 1.0 }
//! presence = { RGS = 0.85, RES = 0.02, PH = 0.45 }
//! ```
//!
//! Supplying `habitats` replaces the whole default table.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::Covariate;
use crate::error::ConfigError;

/// Normal distribution parameters of one covariate in one habitat.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalParams {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// Sampling profile of a single habitat type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HabitatProfile {
    pub name: String,
    pub salinity: NormalParams,
    pub ph: NormalParams,
    pub temperature: NormalParams,
    pub dissolved_oxygen: NormalParams,
    /// Presence probability per species code.
    pub presence: BTreeMap<String, f64>,
}

impl HabitatProfile {
    pub fn distribution(&self, covariate: Covariate) -> NormalParams {
        match covariate {
            Covariate::Salinity => self.salinity,
            Covariate::Ph => self.ph,
            Covariate::Temperature => self.temperature,
            Covariate::DissolvedOxygen => self.dissolved_oxygen,
        }
    }

    /// Presence probability of `species`, if the profile defines one.
    pub fn presence_probability(&self, species: &str) -> Option<f64> {
        self.presence.get(species).copied()
    }
}

/// Where each stage reads and writes its artefacts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub data: PathBuf,
    pub results: PathBuf,
    pub plots: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data/species_habitat_data.csv"),
            results: PathBuf::from("results/analysis_results.json"),
            plots: PathBuf::from("plots"),
        }
    }
}

/// Top-level configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SurveyConfig {
    /// Seed for the generator; only used when `deterministic` is set.
    pub seed: u64,
    pub deterministic: bool,
    /// Number of observations to generate.
    pub samples: usize,
    /// Species codes, in column order.
    pub species: Vec<String>,
    pub habitats: Vec<HabitatProfile>,
    pub paths: PathsConfig,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            deterministic: true,
            samples: 500,
            species: vec!["RGS".into(), "RES".into(), "PH".into()],
            habitats: default_habitats(),
            paths: PathsConfig::default(),
        }
    }
}

fn profile(
    name: &str,
    covariates: [NormalParams; 4],
    presence: [(&str, f64); 3],
) -> HabitatProfile {
    let [salinity, ph, temperature, dissolved_oxygen] = covariates;
    HabitatProfile {
        name: name.to_string(),
        salinity,
        ph,
        temperature,
        dissolved_oxygen,
        presence: presence
            .iter()
            .map(|&(code, p)| (code.to_string(), p))
            .collect(),
    }
}

fn default_habitats() -> Vec<HabitatProfile> {
    vec![
        profile(
            "Clear spring fed pond",
            [
                NormalParams::new(0.2, 0.1),
                NormalParams::new(7.4, 0.3),
                NormalParams::new(12.0, 3.0),
                NormalParams::new(9.0, 1.0),
            ],
            [("RGS", 0.85), ("RES", 0.02), ("PH", 0.45)],
        ),
        profile(
            "vegetated pond",
            [
                NormalParams::new(0.6, 0.4),
                NormalParams::new(7.0, 0.5),
                NormalParams::new(16.0, 4.0),
                NormalParams::new(7.5, 1.5),
            ],
            [("RGS", 0.05), ("RES", 0.25), ("PH", 0.85)],
        ),
        profile(
            "Oxbow analog",
            [
                NormalParams::new(1.0, 0.6),
                NormalParams::new(7.8, 0.6),
                NormalParams::new(17.0, 4.0),
                NormalParams::new(7.2, 1.3),
            ],
            [("RGS", 0.30), ("RES", 0.90), ("PH", 0.50)],
        ),
    ]
}

impl SurveyConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Seed for the generator, or `None` to draw one from the OS.
    pub fn rng_seed(&self) -> Option<u64> {
        self.deterministic.then_some(self.seed)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.species.is_empty() {
            return invalid("at least one species is required".into());
        }
        let mut codes = HashSet::new();
        for code in &self.species {
            if code.is_empty() {
                return invalid("species codes must not be empty".into());
            }
            if !codes.insert(code.as_str()) {
                return invalid(format!("duplicate species code '{code}'"));
            }
        }

        if self.habitats.is_empty() {
            return invalid("at least one habitat profile is required".into());
        }
        let mut names = HashSet::new();
        for habitat in &self.habitats {
            if habitat.name.trim().is_empty() {
                return invalid("habitat names must not be empty".into());
            }
            if !names.insert(habitat.name.as_str()) {
                return invalid(format!("duplicate habitat '{}'", habitat.name));
            }
            for covariate in Covariate::ALL {
                let params = habitat.distribution(covariate);
                if !params.mean.is_finite() {
                    return invalid(format!(
                        "habitat '{}': {} mean must be finite",
                        habitat.name,
                        covariate.key()
                    ));
                }
                if !params.std_dev.is_finite() || params.std_dev < 0.0 {
                    return invalid(format!(
                        "habitat '{}': {} std_dev must be finite and non-negative",
                        habitat.name,
                        covariate.key()
                    ));
                }
            }
            for code in &self.species {
                match habitat.presence_probability(code) {
                    Some(p) if (0.0..=1.0).contains(&p) => {}
                    Some(p) => {
                        return invalid(format!(
                            "habitat '{}': presence probability {p} for {code} is outside [0, 1]",
                            habitat.name
                        ))
                    }
                    None => {
                        return invalid(format!(
                            "habitat '{}' has no presence probability for {code}",
                            habitat.name
                        ))
                    }
                }
            }
        }
        Ok(())
    }

    /// Names of the habitat profiles, in table order.
    pub fn habitat_names(&self) -> Vec<&str> {
        self.habitats.iter().map(|h| h.name.as_str()).collect()
    }
}
