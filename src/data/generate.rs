use log::{debug, info};
use rand::distributions::{Bernoulli, Distribution};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

use super::model::{Covariate, Dataset, Observation};
use crate::config::{HabitatProfile, SurveyConfig};
use crate::error::ConfigError;

/// Split `total` rows across `groups` habitats: every habitat gets
/// `total / groups`, the last one also takes the remainder.
pub fn split_counts(total: usize, groups: usize) -> Vec<usize> {
    if groups == 0 {
        return Vec::new();
    }
    let base = total / groups;
    let mut counts = vec![base; groups];
    counts[groups - 1] += total % groups;
    counts
}

/// Per-habitat samplers, built once before drawing rows.
struct HabitatSampler<'a> {
    profile: &'a HabitatProfile,
    covariates: [Normal<f64>; 4],
    presence: Vec<Bernoulli>,
}

impl<'a> HabitatSampler<'a> {
    fn new(profile: &'a HabitatProfile, species: &[String]) -> Result<Self, ConfigError> {
        let normal = |c: Covariate| {
            let params = profile.distribution(c);
            Normal::new(params.mean, params.std_dev).map_err(|e| {
                ConfigError::Invalid(format!("habitat '{}', {}: {e}", profile.name, c.key()))
            })
        };
        let covariates = [
            normal(Covariate::Salinity)?,
            normal(Covariate::Ph)?,
            normal(Covariate::Temperature)?,
            normal(Covariate::DissolvedOxygen)?,
        ];

        let presence = species
            .iter()
            .map(|code| {
                let p = profile.presence_probability(code).ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "habitat '{}' has no presence probability for {code}",
                        profile.name
                    ))
                })?;
                Bernoulli::new(p).map_err(|e| {
                    ConfigError::Invalid(format!("habitat '{}', {code}: {e}", profile.name))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            profile,
            covariates,
            presence,
        })
    }

    fn draw(&self, id: u64, rng: &mut ChaCha8Rng) -> Observation {
        let mut covariates = [0.0; 4];
        for c in Covariate::ALL {
            covariates[c.index()] = c.clip(self.covariates[c.index()].sample(rng));
        }
        let presence = self
            .presence
            .iter()
            .map(|b| u8::from(b.sample(rng)))
            .collect();

        Observation {
            id,
            habitat: self.profile.name.clone(),
            covariates,
            presence,
        }
    }
}

/// Generate `samples` synthetic observations from the configured habitat
/// profiles.
///
/// Rows are emitted habitat by habitat in table order, with identifiers
/// starting at 1. The same config (seeded) and count always yield the same
/// dataset. Fewer samples than habitat types is rejected.
pub fn generate(config: &SurveyConfig, samples: usize) -> Result<Dataset, ConfigError> {
    config.validate()?;
    if samples == 0 {
        return Err(ConfigError::Invalid(
            "sample count must be positive".into(),
        ));
    }
    if samples < config.habitats.len() {
        return Err(ConfigError::Invalid(format!(
            "{samples} samples cannot cover {} habitat types; '{}' would get no rows",
            config.habitats.len(),
            config.habitats[0].name
        )));
    }

    let mut rng = match config.rng_seed() {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let samplers = config
        .habitats
        .iter()
        .map(|h| HabitatSampler::new(h, &config.species))
        .collect::<Result<Vec<_>, _>>()?;

    let counts = split_counts(samples, samplers.len());
    let mut observations = Vec::with_capacity(samples);

    for (sampler, &count) in samplers.iter().zip(&counts) {
        debug!("drawing {count} observations for '{}'", sampler.profile.name);
        for _ in 0..count {
            let id = observations.len() as u64 + 1;
            observations.push(sampler.draw(id, &mut rng));
        }
    }

    info!(
        "generated {} observations across {} habitat types ({:?})",
        observations.len(),
        samplers.len(),
        counts
    );

    Dataset::new(config.species.clone(), observations)
        .map_err(|e| ConfigError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_gives_remainder_to_last_group() {
        assert_eq!(split_counts(500, 3), vec![166, 166, 168]);
        assert_eq!(split_counts(9, 3), vec![3, 3, 3]);
        assert_eq!(split_counts(2, 3), vec![0, 0, 2]);
        assert!(split_counts(10, 0).is_empty());
    }

    #[test]
    fn rows_are_grouped_in_profile_order() {
        let config = SurveyConfig::default();
        let ds = generate(&config, 500).unwrap();
        assert_eq!(ds.len(), 500);
        assert_eq!(ds.habitats(), config.habitat_names().as_slice());

        let labels: Vec<&str> = ds.observations().iter().map(|o| o.habitat.as_str()).collect();
        assert!(labels[..166].iter().all(|&h| h == "Clear spring fed pond"));
        assert!(labels[166..332].iter().all(|&h| h == "vegetated pond"));
        assert!(labels[332..].iter().all(|&h| h == "Oxbow analog"));

        let ids: Vec<u64> = ds.observations().iter().map(|o| o.id).collect();
        assert_eq!(ids, (1..=500).collect::<Vec<u64>>());
    }

    #[test]
    fn zero_samples_is_rejected() {
        assert!(generate(&SurveyConfig::default(), 0).is_err());
    }

    #[test]
    fn fewer_samples_than_habitats_is_rejected() {
        let err = generate(&SurveyConfig::default(), 2).unwrap_err();
        assert!(err.to_string().contains("Clear spring fed pond"));
        assert_eq!(generate(&SurveyConfig::default(), 3).unwrap().habitats().len(), 3);
    }

    #[test]
    fn certain_probabilities_are_respected() {
        let mut config = SurveyConfig::default();
        for h in &mut config.habitats {
            h.presence.insert("RGS".into(), 1.0);
            h.presence.insert("RES".into(), 0.0);
        }
        let ds = generate(&config, 60).unwrap();
        assert!(ds.observations().iter().all(|o| o.presence[0] == 1));
        assert!(ds.observations().iter().all(|o| o.presence[1] == 0));
    }

    #[test]
    fn zero_spread_yields_the_clipped_mean() {
        let mut config = SurveyConfig::default();
        config.habitats[0].ph.std_dev = 0.0;
        config.habitats[0].ph.mean = 10.5;
        let ds = generate(&config, 30).unwrap();
        let first = &ds.observations()[0];
        assert_eq!(first.covariate(Covariate::Ph), 9.0);
    }

    #[test]
    fn unseeded_runs_still_produce_valid_rows() {
        let config = SurveyConfig {
            deterministic: false,
            ..SurveyConfig::default()
        };
        let ds = generate(&config, 12).unwrap();
        assert_eq!(ds.len(), 12);
    }
}
