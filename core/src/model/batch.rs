use crate::error::Result;
use crate::parser::parse_report_file;
use crate::types::{Dose, ParseOptions};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::record::PatientRecord;

/// Extension of DVH report files
pub const REPORT_EXTENSION: &str = "txt";

/// All patient records of one conversion run, keyed by patient ID
///
/// Iteration is in ascending (ordinal) patient ID order, which is the
/// patient order used by every writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    patients: BTreeMap<String, PatientRecord>,
}

impl Batch {
    /// Creates an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record under its patient ID
    ///
    /// Records without a patient ID are rejected and `false` is returned.
    /// A record whose ID is already present replaces the earlier one.
    pub fn insert(&mut self, record: PatientRecord) -> bool {
        let Some(id) = record.key().map(str::to_string) else {
            return false;
        };
        self.patients.insert(id, record);
        true
    }

    /// Checks if a patient ID is present
    pub fn contains(&self, patient_id: &str) -> bool {
        self.patients.contains_key(patient_id)
    }

    /// Looks up a patient record
    pub fn get(&self, patient_id: &str) -> Option<&PatientRecord> {
        self.patients.get(patient_id)
    }

    /// Number of patients
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    /// Checks if the batch has no patients
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Patient IDs in ascending order
    pub fn patient_ids(&self) -> impl Iterator<Item = &str> {
        self.patients.keys().map(String::as_str)
    }

    /// (patient ID, record) pairs in ascending ID order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatientRecord)> {
        self.patients.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Union of all sampled doses across every patient and structure
    pub fn dose_union(&self) -> BTreeSet<Dose> {
        self.patients
            .values()
            .flat_map(|record| record.dose_union())
            .collect()
    }
}

impl FromIterator<PatientRecord> for Batch {
    fn from_iter<I: IntoIterator<Item = PatientRecord>>(iter: I) -> Self {
        let mut batch = Batch::new();
        for record in iter {
            batch.insert(record);
        }
        batch
    }
}

/// Lists the report files of a directory in ascending path order
///
/// Only regular files with a `.txt` extension (any ASCII case) are returned.
pub fn collect_report_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext.eq_ignore_ascii_case(REPORT_EXTENSION) {
                    files.push(path);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Parses every report in a directory into a [`Batch`]
///
/// `progress` receives the fraction of files parsed so far after each file.
/// Reports without a patient ID are skipped. An empty batch is not an error
/// here; deciding what to do with it is up to the caller.
///
/// # Errors
///
/// Fails on the first directory or file that cannot be read.
pub fn load_batch(
    directory: &Path,
    options: &ParseOptions,
    mut progress: impl FnMut(f64),
) -> Result<Batch> {
    let files = collect_report_files(directory)?;
    info!("Found {} report files in {}", files.len(), directory.display());

    let mut batch = Batch::new();
    let mut sources: BTreeMap<String, PathBuf> = BTreeMap::new();

    for (i, path) in files.iter().enumerate() {
        let record = parse_report_file(path, options)?;

        match record.key().map(str::to_string) {
            Some(id) => {
                if let Some(previous) = sources.insert(id.clone(), path.clone()) {
                    warn!(
                        "Patient ID {} in {} replaces the record from {}",
                        id,
                        path.display(),
                        previous.display()
                    );
                }
                debug!(
                    "Parsed {}: patient {} with {} structures",
                    path.display(),
                    id,
                    record.structures.len()
                );
                batch.insert(record);
            }
            None => debug!("Skipping {}: no Patient ID", path.display()),
        }

        progress((i + 1) as f64 / files.len() as f64);
    }

    info!("Extracted {} patients", batch.len());
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DoseUnit, SamplingInterval};
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_report(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        File::create(&path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        path
    }

    fn options() -> ParseOptions {
        ParseOptions::new(SamplingInterval::One, DoseUnit::Percent)
    }

    #[test]
    fn test_collect_report_files_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        write_report(temp_dir.path(), "b.txt", "");
        write_report(temp_dir.path(), "a.TXT", "");
        write_report(temp_dir.path(), "c.csv", "");
        write_report(temp_dir.path(), "noext", "");
        fs::create_dir(temp_dir.path().join("dir.txt")).unwrap();

        let files = collect_report_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.txt"]);
    }

    #[test]
    fn test_collect_report_files_missing_directory() {
        assert!(collect_report_files(Path::new("/nonexistent/dvh")).is_err());
    }

    #[test]
    fn test_load_batch_keys_by_patient_id() {
        let temp_dir = TempDir::new().unwrap();
        write_report(temp_dir.path(), "one.txt", "Patient ID : P2\nStructure : PTV\n1  1  99.0\n");
        write_report(temp_dir.path(), "two.txt", "Patient ID : P1\nStructure : PTV\n2  1  98.0\n");
        write_report(temp_dir.path(), "anon.txt", "Patient Name : Nobody\nStructure : PTV\n");

        let batch = load_batch(temp_dir.path(), &options(), |_| {}).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.patient_ids().collect::<Vec<_>>(), vec!["P1", "P2"]);
        assert!(batch.contains("P2"));
    }

    #[test]
    fn test_load_batch_duplicate_id_last_file_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_report(temp_dir.path(), "a.txt", "Patient ID : P1\nPatient Name : First\n");
        write_report(temp_dir.path(), "b.txt", "Patient ID : P1\nPatient Name : Second\n");

        let batch = load_batch(temp_dir.path(), &options(), |_| {}).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch.get("P1").unwrap().patient_name.as_deref(),
            Some("Second")
        );
    }

    #[test]
    fn test_load_batch_reports_progress() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..4 {
            write_report(temp_dir.path(), &format!("{}.txt", i), "Patient ID : X\n");
        }

        let mut seen = Vec::new();
        load_batch(temp_dir.path(), &options(), |p| seen.push(p)).unwrap();
        assert_eq!(seen, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_load_batch_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let batch = load_batch(temp_dir.path(), &options(), |_| {}).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_load_batch_unreadable_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        write_report(temp_dir.path(), "good.txt", "Patient ID : P1\n");
        let bad = temp_dir.path().join("bad.txt");
        File::create(&bad).unwrap().write_all(&[0xff, 0xfe, 0xfd]).unwrap();

        assert!(load_batch(temp_dir.path(), &options(), |_| {}).is_err());
    }

    #[test]
    fn test_batch_dose_union() {
        let mut first = PatientRecord::new();
        first.patient_id = Some("A".to_string());
        first.begin_structure("PTV").insert_sample(Dose::new(5.0), 1.0);
        let mut second = PatientRecord::new();
        second.patient_id = Some("B".to_string());
        second.begin_structure("Lung").insert_sample(Dose::new(1.0), 1.0);

        let batch: Batch = vec![first, second].into_iter().collect();
        let doses: Vec<f64> = batch.dose_union().iter().map(Dose::value).collect();
        assert_eq!(doses, vec![1.0, 5.0]);
    }

    #[test]
    fn test_batch_rejects_record_without_id() {
        let mut batch = Batch::new();
        assert!(!batch.insert(PatientRecord::new()));
        assert!(batch.is_empty());
    }
}
