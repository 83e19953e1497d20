//! In-memory data model: per-patient records and the batch of one run

mod batch;
mod record;

pub use batch::{collect_report_files, load_batch, Batch, REPORT_EXTENSION};
pub use record::{PatientRecord, StructureRecord};
