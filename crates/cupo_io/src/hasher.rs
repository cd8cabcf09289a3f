//! Canonical JSON bytes and deterministic digests for emitted artifacts.
//!
//! Canonical form: UTF-8, compact separators, **sorted object keys** (values
//! are routed through `serde_json::Value`, whose map is ordered), array
//! order preserved. Hex digests are lowercase.
//!
//! Use `sha256_canonical(..)` for JSON values/structs and `sha256_hex(..)`
//! for raw bytes.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::IoResult;

/// Canonical bytes of an already-parsed JSON value.
pub fn canonical_json_bytes(v: &Value) -> IoResult<Vec<u8>> {
    Ok(serde_json::to_vec(v)?)
}

/// SHA-256 over raw bytes, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    let v = serde_json::to_value(value)?;
    let bytes = canonical_json_bytes(&v)?;
    Ok(sha256_hex(&bytes))
}

/// Digest of one run's assignment records; recorded next to the artifacts
/// so a verifier can re-derive it from the persisted JSON.
pub fn run_digest(records: &[crate::snapshot::AssignmentRecord]) -> IoResult<String> {
    sha256_canonical(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_bytes_sort_object_keys() {
        let a: Value = serde_json::from_str(r#"{"b":1,"a":2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":2,"b":1}"#).unwrap();
        assert_eq!(canonical_json_bytes(&a).unwrap(), canonical_json_bytes(&b).unwrap());
        assert_eq!(canonical_json_bytes(&a).unwrap(), br#"{"a":2,"b":1}"#.to_vec());
    }

    #[test]
    fn digests_are_lowercase_and_stable() {
        let d1 = sha256_canonical(&json!({ "x": [1, 2, 3] })).unwrap();
        let d2 = sha256_canonical(&json!({ "x": [1, 2, 3] })).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
        assert!(d1.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn array_order_is_significant() {
        let d1 = sha256_canonical(&json!([1, 2])).unwrap();
        let d2 = sha256_canonical(&json!([2, 1])).unwrap();
        assert_ne!(d1, d2);
    }
}
