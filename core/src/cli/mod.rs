pub mod report;

use crate::types::{DoseUnit, SamplingInterval};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for dvhcat
#[derive(Parser, Debug)]
#[command(name = "dvhcat")]
#[command(about = "Inspect the DVH data extracted from one planning-system report")]
#[command(version)]
pub struct Cli {
    /// Path to a DVH text report
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Dose sampling interval
    #[arg(short, long, default_value = "0.5")]
    pub interval: IntervalArg,

    /// Dose unit (selects the dose column)
    #[arg(short, long, default_value = "percent")]
    pub unit: UnitArg,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Sampling interval choices
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IntervalArg {
    #[value(name = "0.1")]
    Tenth,
    #[value(name = "0.5")]
    Half,
    #[value(name = "1")]
    One,
    #[value(name = "5")]
    Five,
    #[value(name = "10")]
    Ten,
}

impl From<IntervalArg> for SamplingInterval {
    fn from(arg: IntervalArg) -> Self {
        match arg {
            IntervalArg::Tenth => SamplingInterval::Tenth,
            IntervalArg::Half => SamplingInterval::Half,
            IntervalArg::One => SamplingInterval::One,
            IntervalArg::Five => SamplingInterval::Five,
            IntervalArg::Ten => SamplingInterval::Ten,
        }
    }
}

/// Dose unit choices
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitArg {
    /// Relative dose, first data column
    #[value(alias = "%")]
    Percent,
    /// Absolute dose, second data column
    #[value(alias = "Gy")]
    Gy,
}

impl From<UnitArg> for DoseUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Percent => DoseUnit::Percent,
            UnitArg::Gy => DoseUnit::Gy,
        }
    }
}

/// Initializes `env_logger`, honoring `RUST_LOG`
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
