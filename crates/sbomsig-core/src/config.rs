//! Configuration structures for sbomsig-core.
//!
//! Explicit, serializable configuration objects used by the CLI and other
//! callers to control limits, signing defaults, and verification policy.
//!
//! The core crate itself does not read environment variables. All configuration
//! must be provided explicitly by the caller.

use serde::{Deserialize, Serialize};

use crate::errors::{SbomSigError, SbomSigResult};
use crate::model::SignatureAlgorithm;

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub limits: LimitsConfig,
    pub signing: SigningConfig,
    pub verify: VerifyConfig,
}

/// Resource limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Largest document accepted by `sign` / `verify`.
    pub max_document_bytes: u64,
    /// Largest key or certificate file read at load time.
    pub max_key_file_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 256 * 1024 * 1024,
            max_key_file_bytes: 1024 * 1024,
        }
    }
}

/// Signing defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SigningConfig {
    pub default_algorithm: SignatureAlgorithm,
    /// Embed the signer's public key as `publicKey` in the block.
    pub embed_public_key: bool,
    /// Used when `sign` is called without an explicit key id.
    pub key_id: Option<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            default_algorithm: SignatureAlgorithm::RS256,
            embed_public_key: true,
            key_id: None,
        }
    }
}

/// Verification policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyConfig {
    /// Reject blocks that omit `excludes` instead of falling back to discovery.
    pub require_excludes: bool,
    /// Use the embedded `publicKey` when no key has been loaded.
    pub trust_embedded_key: bool,
    /// Also accept ASN.1 DER ECDSA signatures.
    pub accept_der_ecdsa: bool,
    /// Reject recorded excludes that no longer resolve and signature fields
    /// added after signing. Both leave the signed bytes unchanged, so by
    /// default they are only reported as warnings.
    pub strict_excludes: bool,
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &EngineConfig) -> SbomSigResult<()> {
    if cfg.limits.max_document_bytes == 0 {
        return Err(SbomSigError::invalid_argument(
            "max_document_bytes must be greater than zero",
        ));
    }

    if cfg.limits.max_key_file_bytes == 0 {
        return Err(SbomSigError::invalid_argument(
            "max_key_file_bytes must be greater than zero",
        ));
    }

    if let Some(id) = &cfg.signing.key_id {
        if id.trim().is_empty() {
            return Err(SbomSigError::invalid_argument("signing key_id must not be blank"));
        }
    }

    Ok(())
}
