// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Canonical Serializer
// ─────────────────────────────────────────────────────────────────────
//! Deterministic JSON encoding used for every hash in the audit trail.
//!
//! Rules:
//! - object keys sorted by byte order, at every depth
//! - no whitespace between tokens
//! - numbers in serde_json's locale-free shortest form (`0.85`, `1.0`, `42`)
//! - strings escaped only where JSON requires it; other UTF-8 passes through
//!
//! Two values with the same keys and values canonicalize to the same
//! bytes regardless of the order fields were inserted.

use serde::Serialize;
use serde_json::Value;

use axiom_types::{GuardError, GuardResult};

use crate::digest::ContentHash;

/// Encode any serializable value into canonical bytes.
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> GuardResult<Vec<u8>> {
    let value = serde_json::to_value(value)
        .map_err(|e| GuardError::Serialization(format!("canonicalize: {e}")))?;
    let mut out = Vec::with_capacity(128);
    write_value(&value, &mut out)?;
    Ok(out)
}

/// Canonical bytes as a UTF-8 string.
pub fn canonical_string<T: Serialize + ?Sized>(value: &T) -> GuardResult<String> {
    let bytes = canonicalize(value)?;
    String::from_utf8(bytes).map_err(|e| GuardError::Serialization(e.to_string()))
}

/// `hash(canonicalize(value))`.
pub fn hash_canonical<T: Serialize + ?Sized>(value: &T) -> GuardResult<ContentHash> {
    Ok(ContentHash::compute(&canonicalize(value)?))
}

fn write_value(value: &Value, out: &mut Vec<u8>) -> GuardResult<()> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out)?;
                out.push(b':');
                write_value(item, out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_string(s: &str, out: &mut Vec<u8>) -> GuardResult<()> {
    serde_json::to_writer(&mut *out, s)
        .map_err(|e| GuardError::Serialization(format!("canonicalize string: {e}")))
}
