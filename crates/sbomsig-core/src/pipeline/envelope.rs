//! The top-level `signature` block.
//!
//! Writing produces pretty-printed JSON for storage and transport; it is never
//! what gets signed. Reading maps the stored object back into `SignatureInfo`.
//! Only `algorithm` and `value` are mandatory; other members are best-effort.

use serde_json::{Map, Value};

use crate::errors::{SbomSigError, SbomSigResult};
use crate::model::{Jwk, SignatureAlgorithm, SignatureInfo};
use crate::pipeline::parse::parse_document;
use crate::SIGNATURE_FIELD;

/// Unbounded parse for helpers that take an already-sized document.
const NO_LIMIT: u64 = u64::MAX;

/// Insert `info` as the top-level `signature` of `document`.
///
/// Any existing top-level block is replaced. The input string is not modified.
pub fn add_signature_to_document(document: &str, info: &SignatureInfo) -> SbomSigResult<String> {
    let mut doc = parse_document(document, NO_LIMIT)?;
    embed_signature(&mut doc, info)?;
    to_pretty(&doc)
}

/// Insert `info` as the top-level `signature` of an in-memory document.
pub fn embed_signature(doc: &mut Value, info: &SignatureInfo) -> SbomSigResult<()> {
    let block = serde_json::to_value(info)
        .map_err(|e| SbomSigError::invalid_argument(format!("cannot encode signature block: {e}")))?;
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| SbomSigError::invalid_argument("document root must be a JSON object to embed a signature"))?;
    obj.insert(SIGNATURE_FIELD.to_string(), block);
    Ok(())
}

/// Read the top-level `signature` block of `document`.
pub fn extract_signature(document: &str) -> SbomSigResult<SignatureInfo> {
    let doc = parse_document(document, NO_LIMIT)?;
    signature_from_value(&doc)
}

/// Read the top-level `signature` block of an in-memory document.
pub fn signature_from_value(doc: &Value) -> SbomSigResult<SignatureInfo> {
    let block = doc
        .as_object()
        .and_then(|o| o.get(SIGNATURE_FIELD))
        .ok_or(SbomSigError::MissingSignature)?;
    let block = block
        .as_object()
        .ok_or_else(|| SbomSigError::malformed_signature("signature block is not an object"))?;

    let algorithm = match block.get("algorithm") {
        Some(Value::String(s)) => SignatureAlgorithm::parse(s)?,
        Some(_) => return Err(SbomSigError::malformed_signature("algorithm is not a string")),
        None => return Err(SbomSigError::malformed_signature("signature block has no algorithm")),
    };
    let value = match block.get("value") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(SbomSigError::malformed_signature("value is not a string")),
        None => return Err(SbomSigError::malformed_signature("signature block has no value")),
    };

    Ok(SignatureInfo {
        algorithm,
        value,
        key_id: optional_string(block, "keyId"),
        timestamp: optional_string(block, "timestamp"),
        excludes: excludes(block)?,
        public_key: public_key(block)?,
    })
}

/// `document` without its top-level `signature` block.
pub fn strip_signature(document: &str) -> SbomSigResult<String> {
    let mut doc = parse_document(document, NO_LIMIT)?;
    strip_signature_value(&mut doc);
    to_pretty(&doc)
}

/// Remove and return the top-level `signature` member, if any.
pub fn strip_signature_value(doc: &mut Value) -> Option<Value> {
    doc.as_object_mut().and_then(|o| o.remove(SIGNATURE_FIELD))
}

fn optional_string(block: &Map<String, Value>, key: &str) -> Option<String> {
    block.get(key).and_then(Value::as_str).map(str::to_string)
}

fn excludes(block: &Map<String, Value>) -> SbomSigResult<Option<Vec<String>>> {
    match block.get("excludes") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| SbomSigError::malformed_signature("excludes must contain only strings"))
            })
            .collect::<SbomSigResult<Vec<_>>>()
            .map(Some),
        Some(_) => Err(SbomSigError::malformed_signature("excludes is not an array")),
    }
}

fn public_key(block: &Map<String, Value>) -> SbomSigResult<Option<Jwk>> {
    match block.get("publicKey") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| SbomSigError::malformed_signature(format!("publicKey is not a JWK: {e}"))),
    }
}

fn to_pretty(doc: &Value) -> SbomSigResult<String> {
    serde_json::to_string_pretty(doc)
        .map_err(|e| SbomSigError::invalid_argument(format!("cannot serialize document: {e}")))
}
