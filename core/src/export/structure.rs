use crate::error::Result;
use crate::model::Batch;
use crate::types::{Dose, DoseUnit};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::format::{csv_writer, format_number, structure_file_name};

/// Key of one cell in the structure pivot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PivotKey {
    pub structure: String,
    pub patient: String,
    pub dose: Dose,
}

impl PivotKey {
    pub fn new(structure: impl Into<String>, patient: impl Into<String>, dose: Dose) -> Self {
        Self {
            structure: structure.into(),
            patient: patient.into(),
            dose,
        }
    }
}

/// Batch DVH samples regrouped by structure
///
/// A flat table of `(structure, patient, dose) -> volume` cells plus the
/// row and column axes shared by every structure file: all patient IDs of
/// the batch in ascending order, and the union of every dose in the batch.
/// Structures only appear when at least one patient has a sample for them.
#[derive(Debug, Clone, Default)]
pub struct StructurePivot {
    cells: BTreeMap<PivotKey, f64>,
    structures: BTreeSet<String>,
    patients: Vec<String>,
    doses: BTreeSet<Dose>,
}

impl StructurePivot {
    /// Regroups a batch by structure
    pub fn from_batch(batch: &Batch) -> Self {
        let mut pivot = StructurePivot {
            patients: batch.patient_ids().map(str::to_string).collect(),
            ..Default::default()
        };

        for (patient_id, record) in batch.iter() {
            for structure in &record.structures {
                for (dose, volume) in &structure.dvh {
                    pivot
                        .cells
                        .insert(PivotKey::new(&structure.name, patient_id, *dose), *volume);
                    pivot.structures.insert(structure.name.clone());
                    pivot.doses.insert(*dose);
                }
            }
        }

        pivot
    }

    /// Volume of `structure` for `patient` at exactly `dose`, if sampled
    pub fn volume(&self, structure: &str, patient: &str, dose: Dose) -> Option<f64> {
        self.cells
            .get(&PivotKey::new(structure, patient, dose))
            .copied()
    }

    /// Structure names in ascending order
    pub fn structures(&self) -> impl Iterator<Item = &str> {
        self.structures.iter().map(String::as_str)
    }

    /// Patient IDs in column order
    pub fn patients(&self) -> &[String] {
        &self.patients
    }

    /// Dose rows in ascending order
    pub fn doses(&self) -> impl Iterator<Item = Dose> + '_ {
        self.doses.iter().copied()
    }

    /// Number of populated cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Checks if no cell is populated
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Writes the wide table of one structure
    ///
    /// Header is the dose column followed by every patient ID; each row is
    /// one dose of the batch-wide dose axis.
    pub fn write_structure_table<W: Write>(
        &self,
        out: &mut W,
        structure: &str,
        unit: DoseUnit,
    ) -> Result<()> {
        let mut writer = csv_writer(out);

        let mut header = vec![unit.dose_header()];
        header.extend(self.patients.iter().cloned());
        writer.write_record(&header)?;

        for dose in self.doses() {
            let mut row = vec![format_number(dose.value())];
            row.extend(self.patients.iter().map(|patient| {
                self.volume(structure, patient, dose)
                    .map(format_number)
                    .unwrap_or_default()
            }));
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Writes one CSV per structure into `output_dir`
///
/// Returns the written paths in structure name order.
pub fn write_structure_csvs(
    batch: &Batch,
    output_dir: &Path,
    unit: DoseUnit,
) -> Result<Vec<PathBuf>> {
    let pivot = StructurePivot::from_batch(batch);
    let mut written = Vec::new();
    let mut owners: HashMap<String, &str> = HashMap::new();

    for structure in pivot.structures() {
        let file_name = structure_file_name(structure);
        if let Some(previous) = owners.insert(file_name.clone(), structure) {
            warn!(
                "Structures {} and {} share the file name {}; the latter overwrites it",
                previous, structure, file_name
            );
        }

        let path = output_dir.join(file_name);
        let mut out = BufWriter::new(File::create(&path)?);
        pivot.write_structure_table(&mut out, structure, unit)?;
        out.flush()?;

        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Wrote {} structure files", written.len());
    Ok(written)
}
