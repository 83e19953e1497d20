use std::path::PathBuf;
use thiserror::Error;

/// Result type for dvhcat operations
pub type Result<T> = std::result::Result<T, DvhError>;

/// Error types for dvhcat operations
#[derive(Error, Debug)]
pub enum DvhError {
    /// Invalid run configuration, detected before any processing
    #[error("Configuration error: {0}")]
    Config(String),

    /// No report in the input directory yielded a patient record
    #[error("No .txt files found or no data was extracted")]
    NoData,

    /// A report file could not be read or decoded
    #[error("Failed to read report {}: {source}", .path.display())]
    ReadReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Settings could not be persisted
    #[error("Settings error: {0}")]
    Settings(String),

    /// Background conversion ended abnormally
    #[error("Worker error: {0}")]
    Worker(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DvhError {
    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        DvhError::Config(message.into())
    }

    /// Checks if this error was raised before any file was touched
    pub fn is_config(&self) -> bool {
        matches!(self, DvhError::Config(_))
    }
}
