//! Content digests for materialized instance configs.

use sha2::{Digest, Sha256};
use serde_json::Value;

/// SHA-256 over the serialized document, hex encoded.
pub fn config_digest(doc: &Value) -> String {
    let mut hasher = Sha256::new();
    let json = serde_json::to_vec(doc).unwrap_or_default();
    hasher.update(&json);
    format!("{:x}", hasher.finalize())
}
