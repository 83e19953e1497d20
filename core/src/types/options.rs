use super::{DoseUnit, SamplingInterval};

/// Options controlling how DVH data rows are read from a report
///
/// # Example
///
/// ```
/// use dvhcat_core::{DoseUnit, ParseOptions, SamplingInterval};
///
/// let options = ParseOptions::default()
///     .with_interval(SamplingInterval::One)
///     .with_unit(DoseUnit::Gy);
///
/// assert_eq!(options.interval.value(), 1.0);
/// assert_eq!(options.dose_column(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Only doses on this grid are kept
    pub interval: SamplingInterval,

    /// Dose unit, which also selects the dose column
    pub unit: DoseUnit,
}

impl ParseOptions {
    /// Creates options from an interval and a unit
    pub fn new(interval: SamplingInterval, unit: DoseUnit) -> Self {
        Self { interval, unit }
    }

    /// Builder: Set sampling interval
    pub fn with_interval(mut self, interval: SamplingInterval) -> Self {
        self.interval = interval;
        self
    }

    /// Builder: Set dose unit
    pub fn with_unit(mut self, unit: DoseUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Index of the dose column within a DVH data row
    pub fn dose_column(&self) -> usize {
        self.unit.column_index()
    }
}

/// Which pivot files a conversion produces
///
/// At least one pivot must be selected for a run to be valid.
///
/// # Example
///
/// ```
/// use dvhcat_core::PivotSelection;
///
/// let selection = PivotSelection::both().patient_wise(false);
/// assert!(!selection.patient_wise);
/// assert!(selection.structure_wise);
/// assert_eq!(selection.count(), 1);
/// assert!(PivotSelection::none().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotSelection {
    /// One CSV per patient
    pub patient_wise: bool,

    /// One CSV per structure
    pub structure_wise: bool,
}

impl Default for PivotSelection {
    fn default() -> Self {
        Self::both()
    }
}

impl PivotSelection {
    /// Selects both pivots
    pub fn both() -> Self {
        Self {
            patient_wise: true,
            structure_wise: true,
        }
    }

    /// Selects no pivot (invalid for a run, useful as a builder start)
    pub fn none() -> Self {
        Self {
            patient_wise: false,
            structure_wise: false,
        }
    }

    /// Builder: Toggle the patient-wise pivot
    pub fn patient_wise(mut self, enabled: bool) -> Self {
        self.patient_wise = enabled;
        self
    }

    /// Builder: Toggle the structure-wise pivot
    pub fn structure_wise(mut self, enabled: bool) -> Self {
        self.structure_wise = enabled;
        self
    }

    /// Number of selected pivots
    pub fn count(&self) -> usize {
        usize::from(self.patient_wise) + usize::from(self.structure_wise)
    }

    /// Checks if no pivot is selected
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}
