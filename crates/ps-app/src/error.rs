//! Error types for the ps-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// adds the sweep-level failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read sweep plan: {path}")]
    PlanRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse sweep plan {path}: {message}")]
    PlanParse { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Sweep has no parameters")]
    NoDimensions,

    #[error("Key path '{path}' is swept by more than one parameter")]
    DuplicateKeyPath { path: String },

    #[error("Key path '{path}' does not resolve in template {template}")]
    UnresolvedKeyPath { path: String, template: PathBuf },

    #[error("Output directory already exists: {path}")]
    OutputDirectoryConflict { path: PathBuf },

    #[error("Series runner has already been evaluated")]
    AlreadyEvaluated,

    #[error("Core error: {0}")]
    Core(#[from] ps_core::CoreError),

    #[error("Sweep error: {0}")]
    Sweep(#[from] ps_sweep::SweepError),

    #[error("Config error: {0}")]
    Config(#[from] ps_config::ConfigError),

    #[error("Results error: {0}")]
    Results(ps_results::ResultsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ps-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ps_results::ResultsError> for AppError {
    fn from(err: ps_results::ResultsError) -> Self {
        match err {
            ps_results::ResultsError::OutputDirectoryConflict { path } => {
                AppError::OutputDirectoryConflict { path }
            }
            other => AppError::Results(other),
        }
    }
}
