//! Stage orchestration shared by the CLI subcommands.
//!
//! Each stage reads its inputs from the paths in [`SurveyConfig::paths`] and
//! writes its artefact there; `run` chains all three and hands the dataset
//! from stage to stage in memory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use crate::analysis::report::render_console;
use crate::analysis::{analyze, AnalysisResult};
use crate::config::SurveyConfig;
use crate::data::generate::generate;
use crate::data::loader::{load_csv, save_csv};
use crate::data::model::Dataset;
use crate::render::render_all;

/// Generate `config.samples` observations and write them to the data path.
pub fn generate_stage(config: &SurveyConfig) -> Result<Dataset> {
    let dataset = generate(config, config.samples).context("generating survey data")?;
    save_csv(&dataset, &config.paths.data)
        .with_context(|| format!("saving {}", config.paths.data.display()))?;
    info!(
        "dataset saved to {} ({} rows)",
        config.paths.data.display(),
        dataset.len()
    );
    Ok(dataset)
}

fn load_dataset(config: &SurveyConfig) -> Result<Dataset> {
    let path = &config.paths.data;
    let dataset = load_csv(path, &config.species)
        .with_context(|| format!("loading {}", path.display()))?;
    info!("loaded {} observations from {}", dataset.len(), path.display());
    Ok(dataset)
}

fn analyze_dataset(config: &SurveyConfig, dataset: &Dataset) -> Result<AnalysisResult> {
    let result = analyze(dataset).context("analyzing survey data")?;
    print!("{}", render_console(&result));
    result.save(&config.paths.results)?;
    Ok(result)
}

/// Analyze the dataset at the data path, print the report and save the JSON.
pub fn analyze_stage(config: &SurveyConfig) -> Result<AnalysisResult> {
    let dataset = load_dataset(config)?;
    analyze_dataset(config, &dataset)
}

/// Draw the charts for the dataset at the data path.
pub fn visualize_stage(config: &SurveyConfig) -> Result<Vec<PathBuf>> {
    let dataset = load_dataset(config)?;
    render_all(&dataset, &config.paths.plots)
}

/// Generate, analyze and visualize in one go.
///
/// Returns every artefact written, data file first.
pub fn run(config: &SurveyConfig) -> Result<Vec<PathBuf>> {
    info!("[1/3] generating {} observations", config.samples);
    let dataset = generate_stage(config)?;

    info!("[2/3] analyzing habitat preferences");
    analyze_dataset(config, &dataset)?;

    info!("[3/3] drawing charts");
    let charts = render_all(&dataset, &config.paths.plots)?;

    let mut artefacts = vec![config.paths.data.clone(), config.paths.results.clone()];
    artefacts.extend(charts);
    info!("pipeline complete, {} files written:", artefacts.len());
    for path in &artefacts {
        info!("  {}", path.display());
    }
    Ok(artefacts)
}
