use std::fmt;
use std::str::FromStr;

/// Tolerance used by the sampling filter
pub const SAMPLING_TOLERANCE: f64 = 1e-9;

/// Unit of the dose column extracted from DVH data rows
///
/// The unit also selects which column of a data row is read as the dose:
/// relative dose is the first column, absolute dose the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoseUnit {
    /// Relative dose in percent of the prescription
    #[default]
    Percent,
    /// Absolute dose in Gray
    Gy,
}

impl DoseUnit {
    /// Returns the index of the dose column within a DVH data row
    pub fn column_index(&self) -> usize {
        match self {
            DoseUnit::Percent => 0,
            DoseUnit::Gy => 1,
        }
    }

    /// Returns the bracketed unit label used in CSV headers
    pub fn label(&self) -> &'static str {
        match self {
            DoseUnit::Percent => "[%]",
            DoseUnit::Gy => "[Gy]",
        }
    }

    /// Returns the header of the dose column, e.g. `Dose [%]`
    pub fn dose_header(&self) -> String {
        format!("Dose {}", self.label())
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            DoseUnit::Percent => "%",
            DoseUnit::Gy => "Gy",
        }
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

impl FromStr for DoseUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "%" | "percent" => Ok(DoseUnit::Percent),
            "gy" => Ok(DoseUnit::Gy),
            other => Err(format!("Unknown dose unit '{}'", other)),
        }
    }
}

/// Dose sampling interval
///
/// Only DVH rows whose dose is a multiple of the interval are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplingInterval {
    Tenth,
    #[default]
    Half,
    One,
    Five,
    Ten,
}

impl SamplingInterval {
    /// All supported intervals, smallest first
    pub const ALL: [SamplingInterval; 5] = [
        SamplingInterval::Tenth,
        SamplingInterval::Half,
        SamplingInterval::One,
        SamplingInterval::Five,
        SamplingInterval::Ten,
    ];

    /// Returns the interval width
    pub fn value(&self) -> f64 {
        match self {
            SamplingInterval::Tenth => 0.1,
            SamplingInterval::Half => 0.5,
            SamplingInterval::One => 1.0,
            SamplingInterval::Five => 5.0,
            SamplingInterval::Ten => 10.0,
        }
    }

    /// Checks whether a dose lies on the sampling grid
    ///
    /// The floored remainder must be within [`SAMPLING_TOLERANCE`] of zero
    /// or of the interval itself. The second test catches values like
    /// `0.3 % 0.1` whose remainder rounds to just below the interval.
    pub fn accepts(&self, dose: f64) -> bool {
        let interval = self.value();
        let remainder = dose.rem_euclid(interval);
        remainder.abs() < SAMPLING_TOLERANCE || (remainder - interval).abs() < SAMPLING_TOLERANCE
    }
}

impl fmt::Display for SamplingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for SamplingInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| format!("Invalid sampling interval '{}': {}", s, e))?;

        Self::ALL
            .iter()
            .copied()
            .find(|interval| (interval.value() - value).abs() < SAMPLING_TOLERANCE)
            .ok_or_else(|| {
                format!(
                    "Unsupported sampling interval '{}' (expected one of 0.1, 0.5, 1, 5, 10)",
                    s
                )
            })
    }
}

impl TryFrom<f64> for SamplingInterval {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        value.to_string().parse()
    }
}
