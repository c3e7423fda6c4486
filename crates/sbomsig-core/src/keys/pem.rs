//! PEM block selection.
//!
//! Key files written by common tooling may hold more than one block, e.g.
//! `openssl ecparam -genkey` emits `EC PARAMETERS` before `EC PRIVATE KEY`.
//! The DER decoders only accept a single block, so loading first picks the
//! block whose label the caller understands.

use ::pem::Pem;

use crate::errors::{SbomSigError, SbomSigResult};

/// The first block whose label is in `labels`.
pub fn select_block(input: &str, labels: &[&str]) -> SbomSigResult<Pem> {
    let blocks = ::pem::parse_many(input)
        .map_err(|e| SbomSigError::key_load(format!("failed to parse PEM: {e}")))?;
    if blocks.is_empty() {
        return Err(SbomSigError::key_load("no PEM block found"));
    }

    let found: Vec<String> = blocks.iter().map(|b| b.tag().to_string()).collect();
    blocks
        .into_iter()
        .find(|b| labels.contains(&b.tag()))
        .ok_or_else(|| {
            SbomSigError::key_load(format!(
                "no supported PEM block (found: {})",
                found.join(", ")
            ))
        })
}
