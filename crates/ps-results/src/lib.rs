//! ps-results: sweep bookkeeping and sensor log reading.

pub mod hash;
pub mod sensor;
pub mod store;
pub mod types;

pub use hash::config_digest;
pub use sensor::{SensorDefinition, SensorReader};
pub use store::{SweepStore, export_csv, load_documentation_file};
pub use types::*;

use std::path::PathBuf;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output directory already exists: {path}")]
    OutputDirectoryConflict { path: PathBuf },

    #[error("Instance directory already exists: {path}")]
    InstanceDirectoryConflict { path: PathBuf },

    #[error("Sweep store at {path} was opened read-only")]
    ReadOnlyStore { path: PathBuf },

    #[error("Documentation not found under {path}")]
    DocumentationNotFound { path: PathBuf },

    #[error("Failed to open sensor log {path}")]
    SensorRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed sensor row in {source_name} line {line}: {reason}")]
    MalformedSensorRow {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("Unknown sensor field: {field}")]
    UnknownField { field: String },

    #[error("Sensor field '{field}' has no samples")]
    EmptySeries { field: String },

    #[error("Sensor field '{field}' needs at least {needed} samples, found {found}")]
    InsufficientSamples {
        field: String,
        needed: usize,
        found: usize,
    },
}
