use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use habitat_survey::config::SurveyConfig;
use habitat_survey::pipeline;

#[derive(Parser, Debug)]
#[command(name = "habitat-survey", version, about)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic survey dataset as CSV.
    Generate {
        /// Number of observations.
        #[arg(long)]
        samples: Option<usize>,
        /// Output CSV path.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Run the statistical analysis and write the JSON report.
    Analyze {
        /// Input CSV path.
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// Output JSON path.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Draw the five survey charts.
    Visualize {
        /// Input CSV path.
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// Directory for the PNG files.
        #[arg(long, short = 'd')]
        output_dir: Option<PathBuf>,
    },
    /// Generate, analyze and visualize in sequence.
    Run {
        #[arg(long)]
        samples: Option<usize>,
        /// CSV path written by the generate stage.
        #[arg(long)]
        data: Option<PathBuf>,
        /// JSON report path.
        #[arg(long)]
        results: Option<PathBuf>,
        /// Directory for the PNG files.
        #[arg(long)]
        plots: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<SurveyConfig> {
    match path {
        Some(path) => {
            let config = SurveyConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            info!("using config {}", path.display());
            Ok(config)
        }
        None => Ok(SurveyConfig::default()),
    }
}

fn override_path(slot: &mut PathBuf, value: Option<PathBuf>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Generate { samples, output } => {
            config.samples = samples.unwrap_or(config.samples);
            override_path(&mut config.paths.data, output);
            pipeline::generate_stage(&config)?;
        }
        Command::Analyze { input, output } => {
            override_path(&mut config.paths.data, input);
            override_path(&mut config.paths.results, output);
            pipeline::analyze_stage(&config)?;
        }
        Command::Visualize { input, output_dir } => {
            override_path(&mut config.paths.data, input);
            override_path(&mut config.paths.plots, output_dir);
            pipeline::visualize_stage(&config)?;
        }
        Command::Run {
            samples,
            data,
            results,
            plots,
        } => {
            config.samples = samples.unwrap_or(config.samples);
            override_path(&mut config.paths.data, data);
            override_path(&mut config.paths.results, results);
            override_path(&mut config.paths.plots, plots);
            pipeline::run(&config)?;
        }
    }
    Ok(())
}
