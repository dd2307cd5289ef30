use serde::{Deserialize, Serialize};

use super::occurrence::OccurrenceRate;
use super::OrderedMap;

/// The habitat in which a species occurs most often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub preferred_habitat: String,
    pub preference_rate: f64,
}

/// Preferred habitat per species.
///
/// `rates` must be in habitat iteration order; on ties the first maximum
/// wins. Species without any rate record are left out.
pub fn preferred_habitats(rates: &[OccurrenceRate], species: &[String]) -> OrderedMap<Preference> {
    let mut summary = OrderedMap::new();
    for code in species {
        let mut best: Option<&OccurrenceRate> = None;
        for rate in rates.iter().filter(|r| &r.species == code) {
            match best {
                Some(b) if rate.occurrence_rate <= b.occurrence_rate => {}
                _ => best = Some(rate),
            }
        }
        if let Some(b) = best {
            summary.insert(
                code.clone(),
                Preference {
                    preferred_habitat: b.water_body_type.clone(),
                    preference_rate: b.occurrence_rate,
                },
            );
        }
    }
    summary
}
