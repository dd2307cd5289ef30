//! PNG charts of a survey dataset.
//!
//! ```text
//!   Dataset ──► ChartData::from_dataset ──► charts::* ──► <out_dir>/*.png
//! ```

pub mod aggregate;
pub mod charts;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::data::model::Dataset;
use aggregate::ChartData;

pub const OCCURRENCE_CHART: &str = "occurrence_by_habitat.png";
pub const HEATMAP_CHART: &str = "habitat_preference_heatmap.png";
pub const ENVIRONMENT_CHART: &str = "environmental_conditions.png";
pub const DISTRIBUTION_CHART: &str = "species_distribution.png";
pub const COOCCURRENCE_CHART: &str = "species_cooccurrence.png";

type ChartFn = fn(&ChartData, &Path) -> Result<()>;

const CHARTS: [(&str, ChartFn); 5] = [
    (OCCURRENCE_CHART, charts::occurrence_by_habitat),
    (HEATMAP_CHART, charts::preference_heatmap),
    (ENVIRONMENT_CHART, charts::environmental_conditions),
    (DISTRIBUTION_CHART, charts::species_distribution),
    (COOCCURRENCE_CHART, charts::species_cooccurrence),
];

/// File names of every chart, in drawing order.
pub fn chart_names() -> impl Iterator<Item = &'static str> {
    CHARTS.iter().map(|(name, _)| *name)
}

/// Draw all five charts into `out_dir`, creating it if needed.
///
/// Existing files are overwritten. Returns the written paths.
pub fn render_all(dataset: &Dataset, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let data = ChartData::from_dataset(dataset).context("aggregating chart data")?;
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(CHARTS.len());
    for (name, draw) in CHARTS {
        let path = out_dir.join(name);
        draw(&data, &path).with_context(|| format!("drawing {}", path.display()))?;
        info!("saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}
