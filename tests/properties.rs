use habitat_survey::analysis::contingency::{chi_square_test, ContingencyTable};
use habitat_survey::analysis::occurrence::occurrence_rates;
use habitat_survey::config::SurveyConfig;
use habitat_survey::data::filter::group_by_habitat;
use habitat_survey::data::generate::{generate, split_counts};
use habitat_survey::data::model::Covariate;
use proptest::prelude::*;

fn seeded(seed: u64) -> SurveyConfig {
    SurveyConfig {
        seed,
        ..SurveyConfig::default()
    }
}

prop_compose! {
    fn arb_table()(rows in 2usize..5, cols in 2usize..4)
        (counts in prop::collection::vec(prop::collection::vec(1u64..40, cols), rows))
        -> ContingencyTable
    {
        let cols = counts[0].len();
        ContingencyTable {
            row_labels: (0..counts.len()).map(|i| format!("h{i}")).collect(),
            col_labels: (0..cols).map(|j| j.to_string()).collect(),
            counts,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn generated_values_stay_in_range(seed in any::<u64>(), samples in 3usize..200) {
        let ds = generate(&seeded(seed), samples).unwrap();
        prop_assert_eq!(ds.len(), samples);
        for obs in ds.observations() {
            for c in Covariate::ALL {
                let (lo, hi) = c.range();
                let v = obs.covariate(c);
                prop_assert!(v >= lo && v <= hi, "{} = {} outside [{}, {}]", c.column(), v, lo, hi);
            }
            prop_assert!(obs.presence.iter().all(|&p| p <= 1));
        }
    }

    #[test]
    fn same_seed_same_dataset(seed in any::<u64>(), samples in 3usize..120) {
        let a = generate(&seeded(seed), samples).unwrap();
        let b = generate(&seeded(seed), samples).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn split_covers_every_row(total in 0usize..5000, groups in 1usize..10) {
        let counts = split_counts(total, groups);
        prop_assert_eq!(counts.len(), groups);
        prop_assert_eq!(counts.iter().sum::<usize>(), total);
        prop_assert!(counts[..groups - 1].iter().all(|&c| c == total / groups));
    }

    #[test]
    fn occurrences_sum_to_presence_total(seed in any::<u64>(), samples in 3usize..300) {
        let ds = generate(&seeded(seed), samples).unwrap();
        let groups = group_by_habitat(&ds);
        let rates = occurrence_rates(&groups, ds.species()).unwrap();
        for (s, code) in ds.species().iter().enumerate() {
            let sum: usize = rates.iter().filter(|r| &r.species == code).map(|r| r.occurrences).sum();
            prop_assert_eq!(sum, ds.presence_total(s));
        }
        prop_assert!(rates.iter().all(|r| (0.0..=100.0).contains(&r.occurrence_rate)));
    }

    #[test]
    fn chi_square_is_well_formed(table in arb_table()) {
        let (rows, cols) = table.shape();
        let test = chi_square_test(&table).unwrap();
        prop_assert!(test.statistic >= 0.0);
        prop_assert!((0.0..=1.0).contains(&test.p_value));
        prop_assert_eq!(test.degrees_of_freedom, (rows - 1) * (cols - 1));
    }
}
