use clap::Parser;
use dvhcat_core::cli::{setup_logging, IntervalArg, UnitArg};
use dvhcat_core::worker::{self, ConversionEvent};
use dvhcat_core::{ConversionOptions, ConversionSummary, PivotSelection, Settings};
use log::{error, info, warn};
use std::path::PathBuf;
use std::process;

/// CLI tool converting a directory of DVH reports into CSV pivots
#[derive(Parser, Debug)]
#[command(name = "dvhconvert")]
#[command(about = "Convert a folder of DVH text reports into patient-wise and structure-wise CSV files")]
#[command(version)]
struct Cli {
    /// Directory containing DVH .txt reports (defaults to the last used one)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Directory receiving the CSV files (defaults to the last used one)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Dose sampling interval
    #[arg(short, long, default_value = "0.5")]
    interval: IntervalArg,

    /// Dose unit (selects the dose column)
    #[arg(short, long, default_value = "percent")]
    unit: UnitArg,

    /// Do not create one CSV per patient
    #[arg(long)]
    no_patient_wise: bool,

    /// Do not create one CSV per structure
    #[arg(long)]
    no_structure_wise: bool,

    /// Settings file remembering the last used folders
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pivots(&self) -> PivotSelection {
        PivotSelection::both()
            .patient_wise(!self.no_patient_wise)
            .structure_wise(!self.no_structure_wise)
    }
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let settings_path = cli.settings.clone().or_else(Settings::default_path);
    let saved = settings_path
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();

    let input = cli.input.clone().or_else(|| saved.input_dir()).unwrap_or_default();
    let output = cli
        .output
        .clone()
        .or_else(|| saved.output_dir())
        .unwrap_or_default();

    let options = ConversionOptions::new(input, output)
        .with_interval(cli.interval.into())
        .with_unit(cli.unit.into())
        .with_pivots(cli.pivots());

    if let Err(e) = options.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let summary = match run(options.clone()) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Conversion failed: {}", e);
            eprintln!("Error: An error occurred during processing: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = settings_path {
        let settings = Settings::new(
            options.input_dir.display().to_string(),
            options.output_dir.display().to_string(),
        );
        if let Err(e) = settings.save(&path) {
            warn!("{}", e);
        }
    }

    println!(
        "The process has been completed successfully: {} patients, {} patient files, {} structure files",
        summary.patients,
        summary.patient_files.len(),
        summary.structure_files.len()
    );
}

/// Runs the conversion in the background, logging progress as it arrives
fn run(options: ConversionOptions) -> dvhcat_core::Result<ConversionSummary> {
    let handle = worker::spawn(options);
    let mut last_percent = None;

    for event in handle.events().iter() {
        match event {
            ConversionEvent::Progress(fraction) => {
                let percent = (fraction * 100.0).round() as u32;
                if last_percent != Some(percent) {
                    info!("Progress: {}%", percent);
                    last_percent = Some(percent);
                }
            }
            ConversionEvent::Finished(result) => return result,
        }
    }

    handle.wait()
}
