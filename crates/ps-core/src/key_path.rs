//! Ordered key paths into nested config documents.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-empty sequence of keys, e.g. `solver.timestep.timestep`.
///
/// Segments that parse as unsigned integers may also index into sequences
/// when the path is resolved against a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn new<I, S>(segments: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(CoreError::InvalidKeyPath {
                path: String::new(),
                reason: "path has no segments",
            });
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(CoreError::InvalidKeyPath {
                path: segments.join("."),
                reason: "path contains an empty segment",
            });
        }
        Ok(Self { segments })
    }

    /// Parse a dotted path.
    pub fn parse(dotted: &str) -> CoreResult<Self> {
        Self::new(dotted.trim().split('.'))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parent segments and the final key.
    pub fn split_last(&self) -> (&[String], &str) {
        match self.segments.split_last() {
            Some((last, parents)) => (parents, last.as_str()),
            None => (&[], ""),
        }
    }

    /// Dotted rendering used as the documentation key.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dotted())
    }
}

impl FromStr for KeyPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dotted())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyPathRepr {
    Dotted(String),
    Segments(Vec<String>),
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match KeyPathRepr::deserialize(deserializer)? {
            KeyPathRepr::Dotted(s) => KeyPath::parse(&s),
            KeyPathRepr::Segments(segments) => KeyPath::new(segments),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}
