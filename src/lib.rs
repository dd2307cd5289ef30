//! Synthetic species–habitat survey: generate observations, test habitat
//! association, and chart the results.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;

pub use analysis::{analyze, AnalysisResult};
pub use config::SurveyConfig;
pub use data::model::{Covariate, Dataset, Observation};
