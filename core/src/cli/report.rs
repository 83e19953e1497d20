use crate::model::PatientRecord;
use crate::types::Dose;
use std::fmt;

/// Text report formatter for one parsed DVH report
pub struct TextReport<'a> {
    record: &'a PatientRecord,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(record: &'a PatientRecord) -> Self {
        Self { record }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DVH Report")?;
        writeln!(f, "==========")?;
        writeln!(f)?;
        writeln!(
            f,
            "Patient ID:      {}",
            self.record.patient_id.as_deref().unwrap_or("unknown")
        )?;
        writeln!(
            f,
            "Patient Name:    {}",
            self.record.patient_name.as_deref().unwrap_or("unknown")
        )?;
        writeln!(
            f,
            "Prescribed Dose: {} Gy",
            self.record.prescribed_dose.as_deref().unwrap_or("unknown")
        )?;
        writeln!(f, "Structures:      {}", self.record.structures.len())?;
        writeln!(f)?;

        for structure in self.record.sorted_structures() {
            writeln!(f, "{}", structure.name)?;
            writeln!(f, "{}", "-".repeat(structure.name.chars().count()))?;
            writeln!(
                f,
                "  Volume [cm³]:  {}",
                structure.volume.as_deref().unwrap_or("-")
            )?;
            writeln!(
                f,
                "  Dose [%]:      min {} / max {} / mean {}",
                structure.min_dose.as_deref().unwrap_or("-"),
                structure.max_dose.as_deref().unwrap_or("-"),
                structure.mean_dose.as_deref().unwrap_or("-")
            )?;
            write!(f, "  Samples:       {}", structure.sample_count())?;
            let first = structure.dvh.keys().next().map(Dose::value);
            let last = structure.dvh.keys().next_back().map(Dose::value);
            if let (Some(first), Some(last)) = (first, last) {
                write!(f, " ({} to {})", first, last)?;
            }
            writeln!(f)?;
            writeln!(f)?;
        }

        Ok(())
    }
}
