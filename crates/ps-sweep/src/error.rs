//! Sweep configuration errors.

use ps_core::CoreError;
use thiserror::Error;

pub type SweepResult<T> = Result<T, SweepError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    /// Range whose step cannot reach its end, detected before any walk.
    #[error("Invalid range configuration for '{name}': {reason}")]
    InvalidRangeConfiguration { name: String, reason: String },

    #[error("Parameter '{path}' needs at least one value")]
    EmptyParameterValues { path: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SweepError {
    pub(crate) fn invalid_range(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRangeConfiguration {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
