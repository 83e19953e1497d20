//! CSV pivots of a [`Batch`](crate::model::Batch)
//!
//! - patient-wise: one file per patient, structures as columns
//! - structure-wise: one file per structure, patients as columns

mod format;
mod patient;
mod structure;

pub use format::{format_number, patient_file_name, sanitize_file_stem, structure_file_name};
pub use patient::{
    volume_column_header, write_patient_csv, write_patient_csvs, write_patient_table,
    STRUCTURE_NAME_HEADER,
};
pub use structure::{write_structure_csvs, PivotKey, StructurePivot};
