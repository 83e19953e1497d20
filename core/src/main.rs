use clap::Parser;
use dvhcat_core::cli::{setup_logging, Cli, OutputFormat};
use dvhcat_core::{parse_report_file, ParseOptions, TextReport};
use log::{error, info};
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let options = ParseOptions::new(cli.interval.into(), cli.unit.into());
    info!(
        "Parsing {} (interval {}, dose {})",
        cli.file.display(),
        options.interval,
        options.unit
    );

    let record = match parse_report_file(&cli.file, &options) {
        Ok(record) => record,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if record.key().is_none() {
        eprintln!("Warning: no Patient ID found; this report would be skipped in a batch");
    }

    match cli.format {
        OutputFormat::Text => println!("{}", TextReport::new(&record)),
        OutputFormat::Json => match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize to JSON: {}", e);
                eprintln!("Error: Failed to serialize to JSON: {}", e);
                process::exit(1);
            }
        },
    }
}
