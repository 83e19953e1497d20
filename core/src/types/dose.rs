use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Dose value used as a DVH key
///
/// Wraps an `f64` with a total order so it can key ordered maps and sets.
/// Negative zero is folded into positive zero so both spellings of the
/// same dose land on one key.
#[derive(Debug, Clone, Copy)]
pub struct Dose(f64);

impl Dose {
    /// Creates a new Dose
    pub fn new(value: f64) -> Self {
        Self(value + 0.0)
    }

    /// Returns the raw dose value
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Dose {
    fn from(value: f64) -> Self {
        Dose::new(value)
    }
}

impl PartialEq for Dose {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Dose {}

impl PartialOrd for Dose {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dose {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Dose {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Dose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
