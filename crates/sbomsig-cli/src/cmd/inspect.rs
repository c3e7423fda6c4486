use anyhow::{bail, Result};
use serde::Serialize;
use tracing::debug;

use sbomsig_core::codec;
use sbomsig_core::config::EngineConfig;
use sbomsig_core::determinism::canonical_json::canonicalize;
use sbomsig_core::keys::{self, PublicKeyMaterial};
use sbomsig_core::model::{Jwk, SignatureInfo};
use sbomsig_core::pipeline::envelope;
use sbomsig_core::pipeline::parse::parse_document;
use sbomsig_core::SbomSigError;

use crate::cmd::Status;
use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureInfo>,
    pub canonical_sha256: String,
    /// `sha256:<hex>` digest fed to the signature primitive; absent for Ed25519
    /// and unsigned documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_digest: Option<String>,
    pub discovered_excludes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct KeyOut {
    pub source: &'static str,
    pub description: String,
    pub fingerprint: String,
    pub jwk: Jwk,
}

#[derive(Debug, Default, Serialize)]
pub struct InspectOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyOut>,
}

pub fn run(cfg: &EngineConfig, doc_path: Option<&str>, key_path: Option<&str>) -> Result<Status> {
    if doc_path.is_none() && key_path.is_none() {
        bail!("nothing to inspect: pass a document and/or --key");
    }

    let mut out = InspectOut::default();
    if let Some(path) = doc_path {
        out.document = Some(inspect_document(cfg, path)?);
    }
    if let Some(path) = key_path {
        out.key = Some(inspect_key(cfg, path)?);
    }

    if output::is_json() {
        output::print(&out)?;
        return Ok(Status::Success);
    }

    if let Some(d) = &out.document {
        match &d.signature {
            Some(sig) => {
                output::field("algorithm", sig.algorithm)?;
                output::field("keyId", sig.key_id.as_deref().unwrap_or("-"))?;
                output::field("timestamp", sig.timestamp.as_deref().unwrap_or("-"))?;
                let recorded = sig
                    .excludes
                    .as_ref()
                    .map(|e| e.join(", "))
                    .unwrap_or_else(|| "(not recorded)".to_string());
                output::field("excludes", recorded)?;
                output::field("embeddedKey", if sig.public_key.is_some() { "yes" } else { "no" })?;
            }
            None => output::field("signature", "(none)")?,
        }
        output::field("canonicalSha256", &d.canonical_sha256)?;
        if let Some(digest) = &d.signed_digest {
            output::field("signedDigest", digest)?;
        }
        output::field("discoveredExcludes", d.discovered_excludes.join(", "))?;
    }
    if let Some(k) = &out.key {
        output::field("key", format!("{} ({})", k.description, k.source))?;
        output::field("fingerprint", &k.fingerprint)?;
        output::field("jwk", serde_json::to_string(&k.jwk)?)?;
    }
    Ok(Status::Success)
}

fn inspect_document(cfg: &EngineConfig, path: &str) -> Result<DocumentOut> {
    let text = input::read_text(path)?;
    let doc = parse_document(&text, cfg.limits.max_document_bytes)?;

    let signature = match envelope::signature_from_value(&doc) {
        Ok(info) => Some(info),
        Err(SbomSigError::MissingSignature) => None,
        Err(e) => return Err(e.into()),
    };
    let canonical = canonicalize(&doc);

    let signed_digest = signature.as_ref().and_then(|s| {
        let alg = s.algorithm.digest()?;
        Some(format!("{}:{}", alg.as_str(), hex::encode(codec::digest(s.algorithm, &canonical.bytes))))
    });

    Ok(DocumentOut {
        signature,
        canonical_sha256: canonical.sha256_hex(),
        signed_digest,
        discovered_excludes: canonical.exclude_strings(),
    })
}

fn inspect_key(cfg: &EngineConfig, path: &str) -> Result<KeyOut> {
    let (source, key): (&'static str, PublicKeyMaterial) =
        if let Ok(k) = keys::load_public_key(path, &cfg.limits) {
            ("public key", k)
        } else if let Ok(k) = keys::load_private_key(path, None, &cfg.limits) {
            ("private key", k.public_key())
        } else {
            debug!(path, "not a plain key, trying certificate");
            ("certificate", keys::load_public_key_from_certificate(path, &cfg.limits)?)
        };

    Ok(KeyOut {
        source,
        description: key.describe(),
        fingerprint: key.fingerprint()?,
        jwk: key.to_jwk(),
    })
}
