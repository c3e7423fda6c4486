//! Document signing.
//!
//! `Signer` owns one private key and the engine configuration. `sign` parses
//! the document, canonicalizes it (excluding every `signature` member), signs
//! the canonical bytes with the requested algorithm and returns a fresh
//! `SignatureInfo`. `add_signature_to_document` splices that block back in.
//!
//! The recorded `excludes` always start with `signature`: the block being built
//! lands there, so the list describes the signed document as stored.

use std::path::Path;

use serde_json::Value;

use crate::codec::{self, encode_b64url, ensure_key_matches};
use crate::config::EngineConfig;
use crate::determinism::canonical_json::canonicalize;
use crate::determinism::exclusion::ExclusionPath;
use crate::errors::{SbomSigError, SbomSigResult};
use crate::keys::{self, PrivateKeyMaterial, PublicKeyMaterial};
use crate::model::{SignatureAlgorithm, SignatureInfo};
use crate::pipeline::envelope;
use crate::pipeline::parse::parse_document;
use crate::pipeline::KeyState;
use crate::SIGNATURE_FIELD;

pub use crate::pipeline::SigningClock;

/// Signs documents with one private key.
///
/// Cloning is cheap; clones share the immutable key.
#[derive(Debug, Clone, Default)]
pub struct Signer {
    config: EngineConfig,
    clock: SigningClock,
    key: KeyState<PrivateKeyMaterial>,
}

impl Signer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: SigningClock::System,
            key: KeyState::Unloaded,
        }
    }

    pub fn with_clock(mut self, clock: SigningClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load the signing key from a PEM file. `password` decrypts an
    /// `ENCRYPTED PRIVATE KEY` block.
    ///
    /// On failure the signer stays unusable and every later `sign` reports the
    /// same `KeyLoad` error.
    pub fn load_private_key(&mut self, path: impl AsRef<Path>, password: Option<&str>) -> SbomSigResult<()> {
        let loaded = keys::load_private_key(path, password, &self.config.limits);
        self.key.store(loaded)
    }

    pub fn set_private_key(&mut self, key: PrivateKeyMaterial) {
        let _ = self.key.store(Ok(key));
    }

    pub fn has_key(&self) -> bool {
        self.key.is_loaded()
    }

    pub fn private_key(&self) -> SbomSigResult<&PrivateKeyMaterial> {
        self.key.get()
    }

    pub fn public_key(&self) -> SbomSigResult<PublicKeyMaterial> {
        Ok(self.key.get()?.public_key())
    }

    /// Sign `document` with `algorithm`.
    ///
    /// Errors: `NoKeyLoaded` (or the stored `KeyLoad` error), `UnsupportedAlgorithm`
    /// when the key cannot produce `algorithm`, `Parse` for invalid JSON,
    /// `SigningBackend` on primitive failure.
    ///
    /// When a nested `signature` sits under a field name the path grammar cannot
    /// express (containing `.`, `[` or `]`, or empty), the block is written
    /// without `excludes` and verifiers fall back to discovering every
    /// `signature` field.
    pub fn sign(
        &self,
        document: &str,
        algorithm: SignatureAlgorithm,
        key_id: Option<&str>,
    ) -> SbomSigResult<SignatureInfo> {
        let key = self.key.get()?;
        ensure_key_matches(algorithm, key.family(), key.curve())?;
        let doc = parse_document(document, self.config.limits.max_document_bytes)?;
        self.sign_value(&doc, algorithm, key_id)
    }

    /// Sign with the configured default algorithm.
    pub fn sign_default(&self, document: &str, key_id: Option<&str>) -> SbomSigResult<SignatureInfo> {
        self.sign(document, self.config.signing.default_algorithm, key_id)
    }

    /// Sign an already parsed document.
    pub fn sign_value(
        &self,
        doc: &Value,
        algorithm: SignatureAlgorithm,
        key_id: Option<&str>,
    ) -> SbomSigResult<SignatureInfo> {
        let key = self.key.get()?;
        ensure_key_matches(algorithm, key.family(), key.curve())?;

        let canonical = canonicalize(doc);
        let excludes = recorded_excludes(doc, &canonical.excludes);

        let raw = codec::sign(algorithm, key, &canonical.bytes)?;
        let timestamp = self.clock.timestamp()?;

        let public_key = if self.config.signing.embed_public_key {
            Some(key.public_key().to_jwk())
        } else {
            None
        };
        let key_id = key_id
            .map(str::to_string)
            .or_else(|| self.config.signing.key_id.clone());

        tracing::info!(
            algorithm = %algorithm,
            key = %key.describe(),
            excludes = ?excludes.as_ref().map(Vec::len),
            canonical_bytes = canonical.bytes.len(),
            "signed document"
        );

        Ok(SignatureInfo {
            algorithm,
            value: encode_b64url(&raw),
            key_id,
            timestamp: Some(timestamp),
            excludes,
            public_key,
        })
    }

    /// Insert `info` as the document's top-level `signature` block.
    pub fn add_signature_to_document(&self, document: &str, info: &SignatureInfo) -> SbomSigResult<String> {
        envelope::add_signature_to_document(document, info)
    }

    /// `sign` followed by `add_signature_to_document`.
    pub fn sign_and_embed(
        &self,
        document: &str,
        algorithm: SignatureAlgorithm,
        key_id: Option<&str>,
    ) -> SbomSigResult<(SignatureInfo, String)> {
        let info = self.sign(document, algorithm, key_id)?;
        let mut doc = parse_document(document, self.config.limits.max_document_bytes)?;
        envelope::embed_signature(&mut doc, &info)?;
        let signed = serde_json::to_string_pretty(&doc)
            .map_err(|e| SbomSigError::invalid_argument(format!("cannot serialize document: {e}")))?;
        Ok((info, signed))
    }
}

/// Textual excludes for the block, top-level `signature` first.
///
/// `None` when some path cannot be written in the path grammar.
fn recorded_excludes(doc: &Value, discovered: &[ExclusionPath]) -> Option<Vec<String>> {
    if let Some(path) = discovered.iter().find(|p| !p.is_replayable()) {
        tracing::warn!(
            path = %path,
            "signature field under a name the path grammar cannot express; omitting excludes"
        );
        return None;
    }

    let mut out = Vec::with_capacity(discovered.len() + 1);
    let has_top_level = discovered.first().is_some_and(ExclusionPath::is_top_level_signature);
    if doc.is_object() && !has_top_level {
        out.push(SIGNATURE_FIELD.to_string());
    }
    out.extend(discovered.iter().map(ToString::to_string));
    Some(out)
}
