// Patient-level keys
pub const PATIENT_NAME: &str = "Patient Name";
pub const PATIENT_ID: &str = "Patient ID";
pub const PRESCRIBED_DOSE: &str = "Prescribed dose [Gy]";

// Section header
pub const STRUCTURE: &str = "Structure";

// Structure statistics
pub const VOLUME: &str = "Volume [cm³]";
pub const MIN_DOSE: &str = "Min Dose [%]";
pub const MAX_DOSE: &str = "Max Dose [%]";
pub const MEAN_DOSE: &str = "Mean Dose [%]";

/// Per-structure summary statistic found inside a structure section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureStatistic {
    Volume,
    MinDose,
    MaxDose,
    MeanDose,
}

impl StructureStatistic {
    /// Statistics in summary-table column order
    pub const ALL: [StructureStatistic; 4] = [
        StructureStatistic::Volume,
        StructureStatistic::MinDose,
        StructureStatistic::MaxDose,
        StructureStatistic::MeanDose,
    ];

    /// Report key, which doubles as the summary column header
    pub fn key(&self) -> &'static str {
        match self {
            StructureStatistic::Volume => VOLUME,
            StructureStatistic::MinDose => MIN_DOSE,
            StructureStatistic::MaxDose => MAX_DOSE,
            StructureStatistic::MeanDose => MEAN_DOSE,
        }
    }

    /// Matches a classified key against the statistic keys
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key() {
        assert_eq!(
            StructureStatistic::from_key("Volume [cm³]"),
            Some(StructureStatistic::Volume)
        );
        assert_eq!(
            StructureStatistic::from_key("Mean Dose [%]"),
            Some(StructureStatistic::MeanDose)
        );
        assert_eq!(StructureStatistic::from_key("Mean Dose [Gy]"), None);
        assert_eq!(StructureStatistic::from_key("volume [cm³]"), None);
    }
}
