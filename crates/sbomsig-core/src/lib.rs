//! sbomsig-core
//!
//! Core primitives for signing SBOM documents:
//! - Canonical JSON encoding with signature-field exclusion
//! - Exclusion paths (`field`, `field.sub`, `field[0].sub`)
//! - Key material loading (PEM keys, X.509 certificates, JWK)
//! - Per-family algorithm codecs (RSA PKCS#1 v1.5, ECDSA raw r||s, Ed25519)
//! - `Signer` / `Verifier` orchestration over a JSON document
//!
//! The library performs no network I/O. Key and certificate files are read once
//! at load time; everything else operates on in-memory documents.

pub mod codec;
pub mod config;
pub mod determinism;
pub mod errors;
pub mod keys;
pub mod model;
pub mod pipeline;

pub use crate::errors::{SbomSigError, SbomSigResult};

/// Reserved key name for embedded signature blocks.
pub const SIGNATURE_FIELD: &str = "signature";

/// Convenience re-exports.
pub mod prelude {
    pub use crate::codec::{codec_for, AlgorithmCodec};
    pub use crate::config::{EngineConfig, LimitsConfig, SigningConfig, VerifyConfig};
    pub use crate::determinism::canonical_json::{canonicalize, verify_canonicalization, Canonical};
    pub use crate::determinism::exclusion::ExclusionPath;
    pub use crate::keys::{KeyFamily, PrivateKeyMaterial, PublicKeyMaterial};
    pub use crate::model::{Jwk, SignatureAlgorithm, SignatureInfo};
    pub use crate::pipeline::sign::{Signer, SigningClock};
    pub use crate::pipeline::verify::{Verifier, VerifyFinding, VerifyLevel, VerifyReport};
    pub use crate::{SbomSigError, SbomSigResult};
}
