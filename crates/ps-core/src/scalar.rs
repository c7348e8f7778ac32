//! Scalar values carried by parameter ranges.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configuration scalar.
///
/// Serialized untagged so JSON/YAML literals map onto variants directly:
/// `true` is `Bool`, `3` is `Int`, `0.5` is `Float`, `"fast"` is `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view of the scalar, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(v) => serde_json::Value::String(v.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Scalar> for serde_json::Value {
    fn from(value: Scalar) -> Self {
        value.to_json()
    }
}

impl TryFrom<&serde_json::Value> for Scalar {
    type Error = CoreError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Bool(v) => Ok(Self::Bool(*v)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or_else(|| CoreError::NotScalar {
                    what: n.to_string(),
                }),
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(CoreError::NotScalar {
                what: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_deserialize_to_matching_variants() {
        let parsed: Vec<Scalar> = serde_json::from_str(r#"[true, 3, 0.5, "fast"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Scalar::Bool(true),
                Scalar::Int(3),
                Scalar::Float(0.5),
                Scalar::Text("fast".to_string()),
            ]
        );
    }

    #[test]
    fn json_conversion_keeps_numbers_numeric() {
        assert_eq!(Scalar::Float(0.25).to_json(), serde_json::json!(0.25));
        assert_eq!(Scalar::Int(10).to_json(), serde_json::json!(10));
        assert_eq!(Scalar::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn containers_are_not_scalars() {
        let err = Scalar::try_from(&serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(err, CoreError::NotScalar { .. }));
        assert_eq!(
            Scalar::try_from(&serde_json::json!(1.5)).unwrap(),
            Scalar::Float(1.5)
        );
    }
}
