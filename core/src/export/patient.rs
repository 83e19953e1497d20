use crate::error::Result;
use crate::model::{Batch, PatientRecord, StructureRecord};
use crate::parser::fields::{PATIENT_ID, PATIENT_NAME, PRESCRIBED_DOSE};
use crate::parser::StructureStatistic;
use crate::types::{Dose, DoseUnit};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::format::{csv_writer, format_number, patient_file_name, write_blank_line};

/// Header of the first summary column
pub const STRUCTURE_NAME_HEADER: &str = "Structure Name";

/// Column header of one structure in the patient DVH table
pub fn volume_column_header(structure: &str) -> String {
    format!("{}_Volume [%]", structure)
}

/// Writes one CSV per patient into `output_dir`
///
/// Patients without structures produce no file. Returns the written paths
/// in patient ID order.
pub fn write_patient_csvs(batch: &Batch, output_dir: &Path, unit: DoseUnit) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let mut owners: HashMap<String, &str> = HashMap::new();

    for (patient_id, record) in batch.iter() {
        if !record.has_structures() {
            debug!("Skipping patient {}: no structures", patient_id);
            continue;
        }

        let file_name = patient_file_name(patient_id);
        if let Some(previous) = owners.insert(file_name.clone(), patient_id) {
            warn!(
                "Patients {} and {} share the file name {}; the latter overwrites it",
                previous, patient_id, file_name
            );
        }

        let path = output_dir.join(file_name);
        write_patient_file(&path, patient_id, record, unit)?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Wrote {} patient files", written.len());
    Ok(written)
}

/// Writes the CSV of a single patient into `output_dir`
///
/// Returns `None` without touching the disk when the record has no patient
/// ID or no structures.
pub fn write_patient_csv(
    record: &PatientRecord,
    output_dir: &Path,
    unit: DoseUnit,
) -> Result<Option<PathBuf>> {
    let Some(patient_id) = record.key() else {
        return Ok(None);
    };
    if !record.has_structures() {
        return Ok(None);
    }

    let path = output_dir.join(patient_file_name(patient_id));
    write_patient_file(&path, patient_id, record, unit)?;
    Ok(Some(path))
}

fn write_patient_file(
    path: &Path,
    patient_id: &str,
    record: &PatientRecord,
    unit: DoseUnit,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_patient_table(&mut out, patient_id, record, unit)?;
    out.flush()?;
    Ok(())
}

/// Writes the three sections of a patient pivot
///
/// 1. Patient name, ID and prescribed dose
/// 2. Per-structure summary statistics
/// 3. Wide DVH table, one row per dose and one column per structure
///
/// Sections are separated by an empty line. Structures are sorted by name.
pub fn write_patient_table<W: Write>(
    out: &mut W,
    patient_id: &str,
    record: &PatientRecord,
    unit: DoseUnit,
) -> Result<()> {
    let structures = record.sorted_structures();

    write_metadata(out, patient_id, record)?;
    write_blank_line(out)?;
    write_summary(out, &structures)?;
    write_blank_line(out)?;
    write_dvh(out, &structures, &record.dose_union(), unit)?;
    Ok(())
}

fn write_metadata<W: Write>(out: &mut W, patient_id: &str, record: &PatientRecord) -> Result<()> {
    let mut writer = csv_writer(out);
    writer.write_record([PATIENT_NAME, record.patient_name.as_deref().unwrap_or("")])?;
    writer.write_record([PATIENT_ID, patient_id])?;
    writer.write_record([
        PRESCRIBED_DOSE,
        record.prescribed_dose.as_deref().unwrap_or(""),
    ])?;
    writer.flush()?;
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, structures: &[&StructureRecord]) -> Result<()> {
    let mut writer = csv_writer(out);

    let mut header = vec![STRUCTURE_NAME_HEADER];
    header.extend(StructureStatistic::ALL.iter().map(|s| s.key()));
    writer.write_record(&header)?;

    for structure in structures {
        let mut row = vec![structure.name.as_str()];
        row.extend(
            StructureStatistic::ALL
                .iter()
                .map(|s| structure.statistic(*s).unwrap_or("")),
        );
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_dvh<W: Write>(
    out: &mut W,
    structures: &[&StructureRecord],
    doses: &BTreeSet<Dose>,
    unit: DoseUnit,
) -> Result<()> {
    let mut writer = csv_writer(out);

    let mut header = vec![unit.dose_header()];
    header.extend(structures.iter().map(|s| volume_column_header(&s.name)));
    writer.write_record(&header)?;

    for dose in doses {
        let mut row = vec![format_number(dose.value())];
        row.extend(structures.iter().map(|s| {
            s.volume_at(*dose)
                .map(format_number)
                .unwrap_or_default()
        }));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_report;
    use crate::types::{ParseOptions, SamplingInterval};
    use std::fs;
    use tempfile::TempDir;

    const REPORT: &str = "\
Patient Name : Doe, Jane
Patient ID : P001
Prescribed dose [Gy] : 60.000
Structure : Rectum
Volume [cm³] : 80.0
Mean Dose [%] : 40.2
0.0  0.0  100.0
10.0  6.0  75.5
Structure : PTV
Volume [cm³] : 123.4
Min Dose [%] : 90.1
Max Dose [%] : 107.2
Mean Dose [%] : 100.3
0.0  0.0  100.0
5.0  3.0  100.0
10.0  6.0  99.9
";

    fn record() -> PatientRecord {
        parse_report(
            REPORT,
            &ParseOptions::new(SamplingInterval::Five, DoseUnit::Percent),
        )
    }

    fn render(record: &PatientRecord, unit: DoseUnit) -> String {
        let mut buf = Vec::new();
        write_patient_table(&mut buf, record.key().unwrap(), record, unit).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_patient_table_layout() {
        let expected = "\
Patient Name,\"Doe, Jane\"\r
Patient ID,P001\r
Prescribed dose [Gy],60.000\r
\r
Structure Name,Volume [cm³],Min Dose [%],Max Dose [%],Mean Dose [%]\r
PTV,123.4,90.1,107.2,100.3\r
Rectum,80.0,,,40.2\r
\r
Dose [%],PTV_Volume [%],Rectum_Volume [%]\r
0.0,100.0,100.0\r
5.0,100.0,\r
10.0,99.9,75.5\r
";
        assert_eq!(render(&record(), DoseUnit::Percent), expected);
    }

    #[test]
    fn test_missing_metadata_renders_empty() {
        let mut record = record();
        record.patient_name = None;
        record.prescribed_dose = None;
        let output = render(&record, DoseUnit::Gy);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "Patient Name,");
        assert_eq!(lines[2], "Prescribed dose [Gy],");
        assert!(output.contains("\r\nDose [Gy],PTV_Volume [%],Rectum_Volume [%]\r\n"));
    }

    #[test]
    fn test_table_dimensions_match_record() {
        let record = record();
        let output = render(&record, DoseUnit::Percent);
        let dvh_section = output.split("\r\n\r\n").nth(2).unwrap();
        let rows: Vec<_> = dvh_section.lines().collect();

        // Header plus one row per distinct dose
        assert_eq!(rows.len(), 1 + record.dose_union().len());
        for row in &rows {
            assert_eq!(row.split(',').count(), 1 + record.structures.len());
        }
    }

    #[test]
    fn test_structure_without_samples_has_empty_column() {
        let report = "Patient ID : P9\nStructure : Empty\nStructure : PTV\n1  1  50.0\n";
        let record = parse_report(
            report,
            &ParseOptions::new(SamplingInterval::One, DoseUnit::Percent),
        );
        let output = render(&record, DoseUnit::Percent);
        assert!(output.ends_with("Dose [%],Empty_Volume [%],PTV_Volume [%]\r\n1.0,,50.0\r\n"));
    }

    #[test]
    fn test_bare_structure_header_still_writes_patient_file() {
        let temp_dir = TempDir::new().unwrap();
        let record = parse_report(
            "Patient ID : P1\nStructure\nVolume [cm³] : 5\n",
            &ParseOptions::default(),
        );
        let batch: Batch = vec![record].into_iter().collect();

        let written = write_patient_csvs(&batch, temp_dir.path(), DoseUnit::Percent).unwrap();
        assert_eq!(written, vec![temp_dir.path().join("P1.csv")]);

        let contents = fs::read_to_string(&written[0]).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines[4],
            "Structure Name,Volume [cm³],Min Dose [%],Max Dose [%],Mean Dose [%]"
        );
        // Unnamed structure with no statistics
        assert!(lines[5].starts_with(','));
        assert_eq!(lines[5].split(',').count(), 5);
        assert_eq!(lines[7], "Dose [%],_Volume [%]");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_write_patient_csvs_skips_patients_without_structures() {
        let temp_dir = TempDir::new().unwrap();
        let mut bare = PatientRecord::new();
        bare.patient_id = Some("P002".to_string());
        let batch: Batch = vec![record(), bare].into_iter().collect();

        let written = write_patient_csvs(&batch, temp_dir.path(), DoseUnit::Percent).unwrap();
        assert_eq!(written, vec![temp_dir.path().join("P001.csv")]);
        assert!(!temp_dir.path().join("P002.csv").exists());

        let contents = fs::read_to_string(&written[0]).unwrap();
        assert_eq!(contents, render(&record(), DoseUnit::Percent));
    }

    #[test]
    fn test_write_patient_csv_single() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_patient_csv(&record(), temp_dir.path(), DoseUnit::Percent)
            .unwrap()
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "P001.csv");

        let anonymous = PatientRecord::new();
        assert!(write_patient_csv(&anonymous, temp_dir.path(), DoseUnit::Percent)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unwritable_output_is_error() {
        let batch: Batch = vec![record()].into_iter().collect();
        let result = write_patient_csvs(&batch, Path::new("/nonexistent/out"), DoseUnit::Percent);
        assert!(result.is_err());
    }
}
