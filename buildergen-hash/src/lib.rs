//! Hashing helpers shared by the planner and the edit engine.

use anyhow::Context;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// sha256 of the canonical JSON form of `value` (object keys sorted).
pub fn fingerprint<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let raw = serde_json::to_value(value).context("serialize for fingerprint")?;
    let canonical = canonicalize_json(&raw);
    let s = serde_json::to_string(&canonical).context("encode canonical json")?;
    Ok(sha256_hex(s.as_bytes()))
}

pub fn canonicalize_json(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut out = serde_json::Map::new();
            for k in keys {
                if let Some(v) = map.get(&k) {
                    out.insert(k, canonicalize_json(v));
                }
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize_json).collect())
        }
        other => other.clone(),
    }
}
