//! Canonical JSON serialization for artifact hashing
//!
//! Object keys are sorted recursively and the output carries no whitespace,
//! so identical values always serialize to identical bytes and therefore
//! identical blake3 hashes.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::Result;

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let raw = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&sort_keys(&raw))?)
}

fn sort_keys(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<String, serde_json::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), sort_keys(v)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sort_keys).collect())
        }
        other => other.clone(),
    }
}

/// Blake3 hash of a value's canonical JSON, hex-encoded
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String> {
    let json = to_canonical_json(value)?;
    Ok(hash_bytes_hex(json.as_bytes()))
}

/// Blake3 hash of raw bytes, hex-encoded
pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        zebra: i64,
        apple: i64,
        label: String,
    }

    #[test]
    fn canonical_json_sorts_keys() {
        let sample = Sample {
            zebra: 2,
            apple: 1,
            label: "x".to_string(),
        };

        let json = to_canonical_json(&sample).unwrap();
        let apple = json.find("apple").unwrap();
        let label = json.find("label").unwrap();
        let zebra = json.find("zebra").unwrap();
        assert!(apple < label);
        assert!(label < zebra);
    }

    #[test]
    fn canonical_json_has_no_whitespace() {
        let sample = Sample {
            zebra: 2,
            apple: 1,
            label: "x".to_string(),
        };

        let json = to_canonical_json(&sample).unwrap();
        assert!(!json.contains('\n'));
        assert!(!json.contains("  "));
    }

    #[test]
    fn hash_is_stable_across_field_order() {
        let a = serde_json::json!({"b": 2, "a": 1});
        let b = serde_json::json!({"a": 1, "b": 2});

        let ha = hash_canonical_hex(&a).unwrap();
        let hb = hash_canonical_hex(&b).unwrap();
        assert_eq!(ha, hb);
        assert_eq!(ha.len(), 64);
    }

    #[test]
    fn hash_changes_with_data() {
        let a = serde_json::json!({"a": 1});
        let b = serde_json::json!({"a": 2});
        assert_ne!(
            hash_canonical_hex(&a).unwrap(),
            hash_canonical_hex(&b).unwrap()
        );
    }
}
