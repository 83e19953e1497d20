//! Core value types for DVH extraction
//!
//! - [`Dose`]: Totally ordered dose value used to key DVH samples
//! - [`DoseUnit`]: Relative (%) or absolute (Gy) dose, selecting the dose column
//! - [`SamplingInterval`]: Dose grid applied while reading DVH rows
//! - [`ParseOptions`]: Interval and unit for one run
//! - [`PivotSelection`]: Which CSV pivots to produce

mod dose;
mod enums;
mod options;

pub use dose::Dose;
pub use enums::{DoseUnit, SamplingInterval, SAMPLING_TOLERANCE};
pub use options::{ParseOptions, PivotSelection};
