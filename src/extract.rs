//! Best-effort recovery of a JSON value from free-form provider text.
//!
//! Models frequently wrap the requested JSON in prose or markdown fencing,
//! or double-encode it as a JSON string. This module digs the value out
//! without ever failing hard: anything unparseable is logged and reported
//! as "no value".

use serde_json::Value;
use tracing::warn;

/// Extract a JSON value from raw model output.
///
/// Scans for the first `{` and the last `}` and parses the inclusive span.
/// If the parse yields a JSON string, that string is parsed one more level
/// (some providers double-encode their payload). Returns `None` when no
/// braces are present or nothing parses; the caller decides whether a
/// non-object value is usable.
pub fn extract_json(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(value) => unwrap_double_encoded(value),
        Err(err) => {
            warn!(error = %err, "extracted span is not valid JSON");
            None
        }
    }
}

/// Re-parse a value that arrived as a JSON-encoded string.
///
/// Non-string values pass through untouched, type intact. A string that
/// fails the second-level parse is treated as "no value".
fn unwrap_double_encoded(value: Value) -> Option<Value> {
    match value {
        Value::String(inner) => match serde_json::from_str::<Value>(&inner) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "double-encoded payload failed to parse");
                None
            }
        },
        value => Some(value),
    }
}
