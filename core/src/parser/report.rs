use crate::error::{DvhError, Result};
use crate::model::PatientRecord;
use crate::types::{Dose, ParseOptions};
use std::fs;
use std::path::Path;

use super::fields::{StructureStatistic, PATIENT_ID, PATIENT_NAME, PRESCRIBED_DOSE, STRUCTURE};
use super::line::{classify_line, row_tokens, ClassifiedLine};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Line-by-line DVH report parser
///
/// Holds the record under construction and the name of the structure whose
/// section is currently open. Statistics and data rows are attributed to the
/// most recent `Structure` line; before the first one, only patient-level
/// keys are recognized.
///
/// Malformed lines never fail: anything that is not understood is skipped.
#[derive(Debug)]
pub struct ReportParser {
    options: ParseOptions,
    record: PatientRecord,
    current_structure: Option<String>,
}

impl ReportParser {
    /// Creates a parser for one report
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            record: PatientRecord::new(),
            current_structure: None,
        }
    }

    /// Consumes one raw line of the report
    pub fn feed(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        let classified = classify_line(line);
        match classified.key {
            PATIENT_NAME => self.record.patient_name = Some(classified.value.to_string()),
            PATIENT_ID => self.record.patient_id = Some(classified.value.to_string()),
            PRESCRIBED_DOSE => self.record.prescribed_dose = Some(classified.value.to_string()),
            STRUCTURE => self.begin_structure(classified.value),
            _ => self.feed_section_line(line, &classified),
        }
    }

    /// Returns the record built so far
    pub fn finish(self) -> PatientRecord {
        self.record
    }

    /// Opens a structure section
    ///
    /// A bare `Structure` header still creates its (unnamed) record, but
    /// leaves no section open, so the lines that follow are not attributed.
    fn begin_structure(&mut self, name: &str) {
        self.record.begin_structure(name);
        self.current_structure = (!name.is_empty()).then(|| name.to_string());
    }

    fn feed_section_line(&mut self, line: &str, classified: &ClassifiedLine<'_>) {
        let Some(name) = self.current_structure.as_deref() else {
            return;
        };
        let Some(structure) = self.record.structure_mut(name) else {
            return;
        };

        if let Some(statistic) = StructureStatistic::from_key(classified.key) {
            structure.set_statistic(statistic, classified.value);
        } else if classified.is_numeric_row() {
            if let Some((dose, volume)) = parse_data_row(line, self.options.dose_column()) {
                if self.options.interval.accepts(dose) {
                    structure.insert_sample(Dose::new(dose), volume);
                }
            }
        }
    }
}

/// Reads (dose, cumulative volume) from a DVH data row
///
/// The dose is taken from `dose_column`, the volume from the last cell.
fn parse_data_row(line: &str, dose_column: usize) -> Option<(f64, f64)> {
    let tokens = row_tokens(line);
    let dose = tokens.get(dose_column)?.parse::<f64>().ok()?;
    let volume = tokens.last()?.parse::<f64>().ok()?;
    Some((dose, volume))
}

/// Parses the text of one DVH report
///
/// A leading byte-order mark is ignored. Any of `\n`, `\r\n` or `\r` ends a line.
///
/// # Example
///
/// ```
/// use dvhcat_core::{parse_report, Dose, ParseOptions};
///
/// let report = "Patient ID : P1\nStructure : PTV\n50.0  10.0  95.2\n50.3  10.1  80.0\n";
/// let record = parse_report(report, &ParseOptions::default());
///
/// assert_eq!(record.key(), Some("P1"));
/// let ptv = record.structure("PTV").unwrap();
/// assert_eq!(ptv.volume_at(Dose::new(50.0)), Some(95.2));
/// assert_eq!(ptv.sample_count(), 1);
/// ```
pub fn parse_report(text: &str, options: &ParseOptions) -> PatientRecord {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut parser = ReportParser::new(*options);
    for line in text.split(['\n', '\r']) {
        parser.feed(line);
    }
    parser.finish()
}

/// Reads and parses one DVH report file
///
/// # Errors
///
/// Returns [`DvhError::ReadReport`] if the file cannot be read or is not valid UTF-8.
pub fn parse_report_file(path: &Path, options: &ParseOptions) -> Result<PatientRecord> {
    let text = fs::read_to_string(path).map_err(|source| DvhError::ReadReport {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_report(&text, options))
}
