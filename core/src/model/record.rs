use crate::parser::fields::StructureStatistic;
use crate::types::Dose;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// DVH data and summary statistics of one structure in one report
///
/// Statistics are kept as the verbatim tokens found in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureRecord {
    /// Structure name as given on its `Structure` line
    pub name: String,

    /// Volume [cm³]
    pub volume: Option<String>,

    /// Min Dose [%]
    pub min_dose: Option<String>,

    /// Max Dose [%]
    pub max_dose: Option<String>,

    /// Mean Dose [%]
    pub mean_dose: Option<String>,

    /// Cumulative volume (% of structure volume) keyed by dose
    #[serde(serialize_with = "serialize_dvh")]
    pub dvh: BTreeMap<Dose, f64>,
}

impl StructureRecord {
    /// Creates an empty structure record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: None,
            min_dose: None,
            max_dose: None,
            mean_dose: None,
            dvh: BTreeMap::new(),
        }
    }

    /// Records a DVH sample; a later sample at the same dose replaces the earlier one
    pub fn insert_sample(&mut self, dose: Dose, volume: f64) {
        self.dvh.insert(dose, volume);
    }

    /// Returns the cumulative volume at exactly this dose
    pub fn volume_at(&self, dose: Dose) -> Option<f64> {
        self.dvh.get(&dose).copied()
    }

    /// Returns a summary statistic
    pub fn statistic(&self, statistic: StructureStatistic) -> Option<&str> {
        match statistic {
            StructureStatistic::Volume => self.volume.as_deref(),
            StructureStatistic::MinDose => self.min_dose.as_deref(),
            StructureStatistic::MaxDose => self.max_dose.as_deref(),
            StructureStatistic::MeanDose => self.mean_dose.as_deref(),
        }
    }

    /// Stores a summary statistic
    pub fn set_statistic(&mut self, statistic: StructureStatistic, value: impl Into<String>) {
        let value = Some(value.into());
        match statistic {
            StructureStatistic::Volume => self.volume = value,
            StructureStatistic::MinDose => self.min_dose = value,
            StructureStatistic::MaxDose => self.max_dose = value,
            StructureStatistic::MeanDose => self.mean_dose = value,
        }
    }

    /// Number of retained DVH samples
    pub fn sample_count(&self) -> usize {
        self.dvh.len()
    }
}

/// Everything extracted from one patient's DVH report
///
/// Structures keep the order in which they were first seen in the report.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PatientRecord {
    /// Patient ID; records without one cannot be keyed and are dropped
    pub patient_id: Option<String>,

    /// Patient Name
    pub patient_name: Option<String>,

    /// Prescribed dose [Gy], verbatim
    pub prescribed_dose: Option<String>,

    /// Structures in order of discovery
    pub structures: Vec<StructureRecord>,
}

impl PatientRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the patient ID if it is present and non-empty
    pub fn key(&self) -> Option<&str> {
        self.patient_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Looks up a structure by name
    pub fn structure(&self, name: &str) -> Option<&StructureRecord> {
        self.structures.iter().find(|s| s.name == name)
    }

    /// Looks up a structure by name for modification
    pub fn structure_mut(&mut self, name: &str) -> Option<&mut StructureRecord> {
        self.structures.iter_mut().find(|s| s.name == name)
    }

    /// Starts a structure section
    ///
    /// A structure seen for the first time is appended; a repeated structure
    /// is cleared in place, keeping its original position.
    pub fn begin_structure(&mut self, name: &str) -> &mut StructureRecord {
        let index = match self.structures.iter().position(|s| s.name == name) {
            Some(index) => {
                self.structures[index] = StructureRecord::new(name);
                index
            }
            None => {
                self.structures.push(StructureRecord::new(name));
                self.structures.len() - 1
            }
        };
        &mut self.structures[index]
    }

    /// Structures sorted by name (ordinal, case-sensitive)
    pub fn sorted_structures(&self) -> Vec<&StructureRecord> {
        let mut sorted: Vec<_> = self.structures.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }

    /// Union of all sampled doses across this patient's structures, ascending
    pub fn dose_union(&self) -> BTreeSet<Dose> {
        self.structures
            .iter()
            .flat_map(|s| s.dvh.keys().copied())
            .collect()
    }

    /// Checks if the report contained at least one structure section
    pub fn has_structures(&self) -> bool {
        !self.structures.is_empty()
    }
}

/// Serializes a DVH as a list of `[dose, volume]` pairs in dose order
fn serialize_dvh<S>(dvh: &BTreeMap<Dose, f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(dvh.len()))?;
    for (dose, volume) in dvh {
        seq.serialize_element(&(dose.value(), *volume))?;
    }
    seq.end()
}
