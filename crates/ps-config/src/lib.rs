//! ps-config: config templates and structural key-path patches.
//!
//! A template is read once and never mutated. Each sweep instance gets a
//! fresh document with its overrides applied, which is then written in the
//! template's own format.

pub mod patch;
pub mod template;

pub use patch::{resolve, set_at};
pub use template::{ConfigFormat, ConfigTemplate};

use std::path::PathBuf;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported config format for {path} (expected .json, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Key path '{path}' does not resolve: no entry '{segment}'")]
    UnresolvedKeyPath { path: String, segment: String },

    #[error("Key path '{path}' descends into a scalar at '{segment}'")]
    NotAContainer { path: String, segment: String },

    #[error("Path field '{path}' must hold a string")]
    NotAPathString { path: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
