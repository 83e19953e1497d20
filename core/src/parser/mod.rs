//! DVH report parsing
//!
//! Turns the text of one planning-system DVH export into a [`PatientRecord`].
//!
//! [`PatientRecord`]: crate::model::PatientRecord

pub mod fields;
pub mod line;
pub mod report;

pub use fields::StructureStatistic;
pub use line::{classify_line, ClassifiedLine};
pub use report::{parse_report, parse_report_file, ReportParser};
