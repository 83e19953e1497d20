use crate::error::{DvhError, Result};
use crate::export::{write_patient_csvs, write_structure_csvs};
use crate::model::{load_batch, Batch};
use crate::types::{DoseUnit, ParseOptions, PivotSelection, SamplingInterval};
use log::info;
use std::path::{Path, PathBuf};

/// Share of the progress range spent on parsing
const PARSE_PROGRESS_SHARE: f64 = 0.5;

/// Everything a conversion run needs
///
/// # Example
///
/// ```
/// use dvhcat_core::{ConversionOptions, DoseUnit, PivotSelection, SamplingInterval};
///
/// let options = ConversionOptions::new("reports", "csv")
///     .with_interval(SamplingInterval::One)
///     .with_unit(DoseUnit::Gy)
///     .with_pivots(PivotSelection::both().structure_wise(false));
///
/// assert_eq!(options.parse.dose_column(), 1);
/// assert!(!options.pivots.structure_wise);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    /// Directory holding the `.txt` DVH reports
    pub input_dir: PathBuf,

    /// Directory receiving the CSV files
    pub output_dir: PathBuf,

    /// Sampling interval and dose unit
    pub parse: ParseOptions,

    /// Pivots to produce
    pub pivots: PivotSelection,
}

impl ConversionOptions {
    /// Creates options with the default interval (0.5), unit (%) and both pivots
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            parse: ParseOptions::default(),
            pivots: PivotSelection::default(),
        }
    }

    /// Builder: Set sampling interval
    pub fn with_interval(mut self, interval: SamplingInterval) -> Self {
        self.parse.interval = interval;
        self
    }

    /// Builder: Set dose unit
    pub fn with_unit(mut self, unit: DoseUnit) -> Self {
        self.parse.unit = unit;
        self
    }

    /// Builder: Set pivot selection
    pub fn with_pivots(mut self, pivots: PivotSelection) -> Self {
        self.pivots = pivots;
        self
    }

    /// Checks the configuration before anything is read or written
    ///
    /// # Errors
    ///
    /// Returns [`DvhError::Config`] if a folder is missing, does not exist
    /// or is not a directory, or if no pivot is selected.
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() || self.output_dir.as_os_str().is_empty() {
            return Err(DvhError::config(
                "Please select both an input and an output folder",
            ));
        }
        check_directory(&self.input_dir)?;
        check_directory(&self.output_dir)?;
        if self.pivots.is_empty() {
            return Err(DvhError::config("Please select at least one output format"));
        }
        Ok(())
    }
}

fn check_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(DvhError::config(format!(
            "{} does not exist or is not a folder",
            path.display()
        )))
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversionSummary {
    /// Number of patients extracted
    pub patients: usize,

    /// Patient-wise files written
    pub patient_files: Vec<PathBuf>,

    /// Structure-wise files written
    pub structure_files: Vec<PathBuf>,
}

impl ConversionSummary {
    /// Total number of files written
    pub fn files_written(&self) -> usize {
        self.patient_files.len() + self.structure_files.len()
    }
}

/// Runs the load-then-write pipeline for one directory of reports
///
/// Each run builds its own [`Batch`] and drops it when done. The run stops
/// at the first fatal error; files already written are left in place.
#[derive(Debug, Clone)]
pub struct DvhConverter {
    options: ConversionOptions,
}

impl DvhConverter {
    /// Creates a converter
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// Returns the run configuration
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Runs the conversion
    ///
    /// `progress` receives a fraction in `[0, 1]`: parsing covers the first
    /// half, each selected pivot an equal share of the second. The last
    /// value reported on success is `1.0`.
    ///
    /// # Errors
    ///
    /// - [`DvhError::Config`] before any processing if the options are invalid
    /// - [`DvhError::NoData`] if no report yielded a patient record
    /// - I/O and CSV errors from reading reports or writing files
    pub fn run(&self, mut progress: impl FnMut(f64)) -> Result<ConversionSummary> {
        self.options.validate()?;

        info!(
            "Converting {} -> {} (interval {}, dose {})",
            self.options.input_dir.display(),
            self.options.output_dir.display(),
            self.options.parse.interval,
            self.options.parse.unit
        );

        let batch = self.load(|fraction| progress(fraction * PARSE_PROGRESS_SHARE))?;
        self.write(&batch, progress)
    }

    /// Parses the input directory into a non-empty batch
    pub fn load(&self, progress: impl FnMut(f64)) -> Result<Batch> {
        let batch = load_batch(&self.options.input_dir, &self.options.parse, progress)?;
        if batch.is_empty() {
            return Err(DvhError::NoData);
        }
        Ok(batch)
    }

    /// Writes the selected pivots of a batch
    pub fn write(&self, batch: &Batch, mut progress: impl FnMut(f64)) -> Result<ConversionSummary> {
        let pivots = self.options.pivots;
        let step = (1.0 - PARSE_PROGRESS_SHARE) / pivots.count().max(1) as f64;
        let unit = self.options.parse.unit;
        let output_dir = &self.options.output_dir;

        let mut summary = ConversionSummary {
            patients: batch.len(),
            ..Default::default()
        };
        let mut done = PARSE_PROGRESS_SHARE;

        if pivots.patient_wise {
            summary.patient_files = write_patient_csvs(batch, output_dir, unit)?;
            done += step;
            progress(done);
        }

        if pivots.structure_wise {
            summary.structure_files = write_structure_csvs(batch, output_dir, unit)?;
            done += step;
            progress(done);
        }

        if done < 1.0 {
            progress(1.0);
        }
        info!(
            "Wrote {} files for {} patients",
            summary.files_written(),
            summary.patients
        );
        Ok(summary)
    }
}
