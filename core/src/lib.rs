//! Extraction of dose-volume histograms from planning-system text reports
//! and re-tabulation into patient-wise and structure-wise CSV pivots.

pub mod api;
pub mod cli;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod settings;
pub mod types;
pub mod worker;

pub use api::{ConversionOptions, ConversionSummary, DvhConverter};
pub use cli::report::TextReport;
pub use error::{DvhError, Result};
pub use export::{write_patient_csvs, write_structure_csvs, StructurePivot};
pub use model::{load_batch, Batch, PatientRecord, StructureRecord};
pub use parser::{parse_report, parse_report_file};
pub use settings::Settings;
pub use types::*;
