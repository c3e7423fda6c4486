//! sbomsig data models.
//!
//! Strongly-typed representations of what travels inside a signed document:
//! - `SignatureAlgorithm`: the closed set of supported algorithms
//! - `SignatureInfo`: the signature block produced by `Signer::sign`
//! - `Jwk`: the JWK-like public key embedded for self-contained verification
//!
//! Models are mostly "dumb" data. Canonical bytes are never produced from serde
//! formatting; use `crate::determinism::canonical_json` for anything that is signed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{SbomSigError, SbomSigResult};

/// Key family an algorithm belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFamily {
    Rsa,
    Ec,
    EdDsa,
}

impl KeyFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::EdDsa => "EdDSA",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NIST curves accepted for ECDSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    /// JWK `crv` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    pub fn from_jwk_name(s: &str) -> SbomSigResult<Self> {
        match s {
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            "P-521" => Ok(Self::P521),
            _ => Err(SbomSigError::key_load(format!("unsupported curve: {s}"))),
        }
    }

    /// Byte length of the curve order, i.e. the width of each of r and s.
    pub fn scalar_len(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

/// Digest algorithms used ahead of RSA and ECDSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlg {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlg {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

/// Supported signature algorithms.
///
/// Each variant fixes the key family, the digest (none for Ed25519), and the
/// signature encoding: raw PKCS#1 v1.5 for RSA, fixed-width `r || s` for ECDSA,
/// raw 64 bytes for Ed25519.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
    ES512,
    Ed25519,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 7] = [
        Self::RS256,
        Self::RS384,
        Self::RS512,
        Self::ES256,
        Self::ES384,
        Self::ES512,
        Self::Ed25519,
    ];

    pub fn parse(s: &str) -> SbomSigResult<Self> {
        match s {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            "ES512" => Ok(Self::ES512),
            "Ed25519" => Ok(Self::Ed25519),
            _ => Err(SbomSigError::unsupported_algorithm(format!(
                "unknown signature algorithm: {s}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
            Self::Ed25519 => "Ed25519",
        }
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            Self::RS256 | Self::RS384 | Self::RS512 => KeyFamily::Rsa,
            Self::ES256 | Self::ES384 | Self::ES512 => KeyFamily::Ec,
            Self::Ed25519 => KeyFamily::EdDsa,
        }
    }

    /// Digest applied before the primitive. `None` for Ed25519, which hashes internally.
    pub fn digest(&self) -> Option<DigestAlg> {
        match self {
            Self::RS256 | Self::ES256 => Some(DigestAlg::Sha256),
            Self::RS384 | Self::ES384 => Some(DigestAlg::Sha384),
            Self::RS512 | Self::ES512 => Some(DigestAlg::Sha512),
            Self::Ed25519 => None,
        }
    }

    /// Curve required by an ECDSA algorithm.
    pub fn curve(&self) -> Option<EcCurve> {
        match self {
            Self::ES256 => Some(EcCurve::P256),
            Self::ES384 => Some(EcCurve::P384),
            Self::ES512 => Some(EcCurve::P521),
            _ => None,
        }
    }

    /// Expected signature length in bytes. `None` for RSA (depends on modulus size).
    pub fn fixed_signature_len(&self) -> Option<usize> {
        match self {
            Self::ES256 | Self::ES384 | Self::ES512 => self.curve().map(|c| c.scalar_len() * 2),
            Self::Ed25519 => Some(64),
            _ => None,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = SbomSigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// JWK-like public key.
///
/// Members are base64url without padding. Only the members relevant to `kty`
/// are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// Signature block produced by signing and read back by verification.
///
/// Constructed fresh on every `sign` call and never mutated afterwards.
/// Only `algorithm` and `value` are guaranteed when read from a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub algorithm: SignatureAlgorithm,
    /// base64url, unpadded.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// ISO-8601 UTC with millisecond precision, e.g. `2025-01-01T00:00:00.000Z`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Exclusion paths in walk order. `None` when the stored block omitted them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excludes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Jwk>,
}
