use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid key path '{path}': {reason}")]
    InvalidKeyPath { path: String, reason: &'static str },

    #[error("Cannot convert {what} to a scalar")]
    NotScalar { what: String },
}
