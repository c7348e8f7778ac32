use core::fmt;
use serde::{Deserialize, Serialize};

/// Identifier of one sweep instance.
///
/// Ids are handed out from 0 in visitation order and name every artifact of
/// the instance (`i<id>.json`, `i<id>/`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    pub const FIRST: InstanceId = InstanceId(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Artifact stem shared by the instance config file and output directory.
    pub fn stem(self) -> String {
        format!("i{}", self.0)
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for InstanceId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_and_name_artifacts() {
        let first = InstanceId::FIRST;
        let second = first.next();
        assert!(second > first);
        assert_eq!(first.stem(), "i0");
        assert_eq!(second.stem(), "i1");
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&InstanceId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: InstanceId = serde_json::from_str("7").unwrap();
        assert_eq!(back.value(), 7);
    }
}
