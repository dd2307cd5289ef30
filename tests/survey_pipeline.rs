use std::fs;

use habitat_survey::analysis::analyze;
use habitat_survey::config::SurveyConfig;
use habitat_survey::data::generate::generate;
use habitat_survey::data::loader::{load_csv, save_csv};
use habitat_survey::data::model::{Covariate, Dataset, Observation};
use habitat_survey::pipeline;
use habitat_survey::render::chart_names;

fn observation(id: u64, habitat: &str, temperature: f64, presence: Vec<u8>) -> Observation {
    Observation {
        id,
        habitat: habitat.to_string(),
        covariates: [0.4, 7.3, temperature, 8.1],
        presence,
    }
}

#[test]
fn species_confined_to_one_habitat_is_maximally_associated() {
    let mut rows = Vec::new();
    for habitat in ["A", "B", "C"] {
        for k in 0..3 {
            let id = rows.len() as u64 + 1;
            let presence = vec![u8::from(habitat == "A"), (k % 2) as u8];
            rows.push(observation(id, habitat, 10.0 + k as f64, presence));
        }
    }
    let ds = Dataset::new(vec!["ONLY_A".into(), "MIXED".into()], rows).unwrap();
    let result = analyze(&ds).unwrap();

    let test = result.contingency_analysis.get("ONLY_A").unwrap();
    assert!((test.chi2_statistic - 9.0).abs() < 1e-9);
    assert!((test.p_value - (-4.5f64).exp()).abs() < 1e-6);
    assert_eq!(test.degrees_of_freedom, 2);
    assert!(test.significant);

    let pref = result.summary.get("ONLY_A").unwrap();
    assert_eq!(pref.preferred_habitat, "A");
    assert_eq!(pref.preference_rate, 100.0);

    let temperature = result.habitat_characteristics.get("B").unwrap().get(Covariate::Temperature);
    assert!((temperature.mean - 11.0).abs() < 1e-12);
    assert!((temperature.std_dev - 1.0).abs() < 1e-12);
}

#[test]
fn default_survey_splits_500_rows_166_166_168() {
    let config = SurveyConfig::default();
    let ds = generate(&config, 500).unwrap();
    assert_eq!(ds.len(), 500);
    assert_eq!(ds.habitats(), config.habitat_names().as_slice());

    let sizes: Vec<usize> = ds
        .habitats()
        .iter()
        .map(|h| ds.observations().iter().filter(|o| &o.habitat == h).count())
        .collect();
    assert_eq!(sizes, vec![166, 166, 168]);

    let ids: Vec<u64> = ds.observations().iter().map(|o| o.id).collect();
    assert_eq!(ids, (1..=500).collect::<Vec<_>>());
}

#[test]
fn single_row_habitat_reports_null_std() {
    let rows = vec![
        observation(1, "lake", 12.0, vec![1]),
        observation(2, "lake", 14.0, vec![0]),
        observation(3, "puddle", 20.0, vec![1]),
    ];
    let ds = Dataset::new(vec!["S".into()], rows).unwrap();
    let result = analyze(&ds).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    let puddle = &json["habitat_characteristics"]["puddle"];
    assert_eq!(puddle["temperature_mean"], 20.0);
    assert!(puddle["temperature_std"].is_null());
    assert!(json["habitat_characteristics"]["lake"]["temperature_std"].is_number());
}

#[test]
fn csv_round_trip_preserves_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/survey.csv");
    let config = SurveyConfig::default();

    let ds = generate(&config, 150).unwrap();
    save_csv(&ds, &path).unwrap();
    let loaded = load_csv(&path, &config.species).unwrap();

    assert_eq!(loaded.len(), ds.len());
    assert_eq!(loaded.habitats(), ds.habitats());
    assert_eq!(loaded.species(), ds.species());

    let before = analyze(&ds).unwrap();
    let after = analyze(&loaded).unwrap();
    assert_eq!(before.summary, after.summary);
    for (species, test) in before.contingency_analysis.iter() {
        let other = after.contingency_analysis.get(species).unwrap();
        assert_eq!(test.contingency_table, other.contingency_table);
        assert!((test.chi2_statistic - other.chi2_statistic).abs() < 1e-9);
    }
}

#[test]
fn analyze_stage_rejects_missing_species_column() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SurveyConfig::default();
    config.paths.data = dir.path().join("survey.csv");
    config.paths.results = dir.path().join("results.json");
    fs::write(
        &config.paths.data,
        "observation_id,water_body_type,salinity_ppt,pH,temperature_C,dissolved_oxygen_mg_L,RGS_present,RES_present\n\
         1,pond,0.2,7.1,12.0,9.0,1,0\n",
    )
    .unwrap();

    let err = pipeline::analyze_stage(&config).unwrap_err();
    assert!(format!("{err:#}").contains("PH_present"));
    assert!(!config.paths.results.exists());
}

#[test]
fn analyze_stage_writes_pretty_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SurveyConfig::default();
    config.samples = 90;
    config.paths.data = dir.path().join("data.csv");
    config.paths.results = dir.path().join("out/results.json");

    pipeline::generate_stage(&config).unwrap();
    pipeline::analyze_stage(&config).unwrap();

    let text = fs::read_to_string(&config.paths.results).unwrap();
    assert!(text.contains("\n  \"contingency_analysis\""));
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["occurrence_rates"].as_array().unwrap().len(), 9);
    assert_eq!(json["summary"].as_object().unwrap().len(), 3);
}

fn config_in(dir: &std::path::Path) -> SurveyConfig {
    let mut config = SurveyConfig::default();
    config.samples = 90;
    config.paths.data = dir.join("data/survey.csv");
    config.paths.results = dir.join("results/analysis.json");
    config.paths.plots = dir.join("plots");
    config
}

fn assert_non_empty(path: &std::path::Path) {
    let meta = fs::metadata(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
    assert!(meta.len() > 0, "{} is empty", path.display());
}

#[test]
fn run_writes_every_artefact_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let artefacts = pipeline::run(&config).unwrap();

    let mut expected = vec![config.paths.data.clone(), config.paths.results.clone()];
    expected.extend(chart_names().map(|name| config.paths.plots.join(name)));
    assert_eq!(artefacts, expected);
    for path in &artefacts {
        assert_non_empty(path);
    }

    let png_signature = [0x89u8, b'P', b'N', b'G'];
    for name in chart_names() {
        let bytes = fs::read(config.paths.plots.join(name)).unwrap();
        assert_eq!(&bytes[..4], &png_signature, "{name} is not a PNG");
    }
}

#[test]
fn visualize_stage_reads_csv_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    pipeline::generate_stage(&config).unwrap();

    let charts = pipeline::visualize_stage(&config).unwrap();

    assert_eq!(charts.len(), 5);
    for (path, name) in charts.iter().zip(chart_names()) {
        assert_eq!(path, &config.paths.plots.join(name));
        assert_non_empty(path);
    }
    assert!(!config.paths.results.exists());
}

#[test]
fn visualize_stage_without_data_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let err = pipeline::visualize_stage(&config).unwrap_err();
    assert!(format!("{err:#}").contains("survey.csv"));
    assert!(!config.paths.plots.exists());
}
