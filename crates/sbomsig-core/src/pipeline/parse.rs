//! Parsing helpers for pipeline inputs.
//!
//! Strict JSON parsing with a hard size limit. Callers pass the limit from
//! `LimitsConfig`; nothing here reads the environment.

use serde_json::Value;

use crate::errors::{SbomSigError, SbomSigResult};

/// Parse JSON bytes into a `Value`, rejecting payloads over `max_bytes`.
pub fn parse_json_bytes(bytes: &[u8], max_bytes: u64) -> SbomSigResult<Value> {
    if bytes.len() as u64 > max_bytes {
        return Err(SbomSigError::parse(format!(
            "JSON payload too large ({} bytes > limit {})",
            bytes.len(),
            max_bytes
        )));
    }

    serde_json::from_slice(bytes).map_err(|e| SbomSigError::parse(format!("failed to parse JSON: {e}")))
}

/// Parse a document string.
pub fn parse_document(document: &str, max_bytes: u64) -> SbomSigResult<Value> {
    parse_json_bytes(document.as_bytes(), max_bytes)
}
