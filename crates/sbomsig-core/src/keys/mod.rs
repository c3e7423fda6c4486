//! Key material.
//!
//! Loads exactly one asymmetric key from PEM: a private key (PKCS#8, PKCS#1 RSA,
//! or SEC1 EC), a public key (SPKI or PKCS#1 RSA), or the subject public key of a
//! single X.509 certificate. Supported types are RSA, EC P-256/P-384/P-521, and
//! Ed25519. Anything else fails with `KeyLoad`.
//!
//! No certificate-path validation happens here; a certificate is only a carrier
//! for its public key.

pub mod jwk;
pub mod pem;

use std::fmt;
use std::fs;
use std::path::Path;

use pkcs8::der::Decode;
use pkcs8::spki::SubjectPublicKeyInfoRef;
use pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePublicKey, EncryptedPrivateKeyInfo, ObjectIdentifier,
    PrivateKeyInfo,
};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use x509_cert::der::Encode;
use x509_cert::Certificate;

use crate::config::LimitsConfig;
use crate::determinism::hashing::sha256_hex;
use crate::errors::{SbomSigError, SbomSigResult};
pub use crate::model::{EcCurve, KeyFamily};

const OID_RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const OID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
const OID_PRIME256V1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const OID_SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const OID_SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

const PRIVATE_LABELS: &[&str] = &[
    "PRIVATE KEY",
    "RSA PRIVATE KEY",
    "EC PRIVATE KEY",
    "ENCRYPTED PRIVATE KEY",
];
const PUBLIC_LABELS: &[&str] = &["PUBLIC KEY", "RSA PUBLIC KEY"];
const CERTIFICATE_LABELS: &[&str] = &["CERTIFICATE"];

/// A loaded private key.
pub enum PrivateKeyMaterial {
    Rsa(Box<RsaPrivateKey>),
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
    Ed25519(ed25519_dalek::SigningKey),
}

/// A loaded public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyMaterial {
    Rsa(RsaPublicKey),
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PrivateKeyMaterial {
    /// Parse the first private-key block of an unencrypted PEM document.
    pub fn from_pem(input: &str) -> SbomSigResult<Self> {
        Self::decode_pem(input, None)
    }

    /// Parse the first private-key block, decrypting an `ENCRYPTED PRIVATE KEY`
    /// (PKCS#8 PBES2) with `password`. Unencrypted blocks ignore the password.
    pub fn from_pem_with_password(input: &str, password: &[u8]) -> SbomSigResult<Self> {
        Self::decode_pem(input, Some(password))
    }

    fn decode_pem(input: &str, password: Option<&[u8]>) -> SbomSigResult<Self> {
        let block = pem::select_block(input, PRIVATE_LABELS)?;
        let der = block.contents();
        match block.tag() {
            "PRIVATE KEY" => Self::from_pkcs8_der(der),
            "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_der(der)
                .map(|k| Self::Rsa(Box::new(k)))
                .map_err(|e| SbomSigError::key_load(format!("invalid PKCS#1 RSA key: {e}"))),
            "EC PRIVATE KEY" => Self::from_sec1_der(der),
            "ENCRYPTED PRIVATE KEY" => {
                let password = password.ok_or_else(|| {
                    SbomSigError::key_load("private key is encrypted and no password was given")
                })?;
                let info = EncryptedPrivateKeyInfo::try_from(der)
                    .map_err(|e| SbomSigError::key_load(format!("invalid encrypted PKCS#8 structure: {e}")))?;
                let doc = info.decrypt(password).map_err(|e| {
                    SbomSigError::key_load(format!("cannot decrypt private key (check password): {e}"))
                })?;
                Self::from_pkcs8_der(doc.as_bytes())
            }
            other => Err(SbomSigError::key_load(format!("unsupported PEM label: {other}"))),
        }
    }

    /// Parse a PKCS#8 `PrivateKeyInfo`, dispatching on its algorithm OID.
    pub fn from_pkcs8_der(der: &[u8]) -> SbomSigResult<Self> {
        let info = PrivateKeyInfo::try_from(der)
            .map_err(|e| SbomSigError::key_load(format!("invalid PKCS#8 structure: {e}")))?;
        let invalid = |e: pkcs8::Error| SbomSigError::key_load(format!("invalid private key: {e}"));

        match info.algorithm.oid {
            OID_RSA_ENCRYPTION => RsaPrivateKey::from_pkcs8_der(der)
                .map(|k| Self::Rsa(Box::new(k)))
                .map_err(invalid),
            OID_EC_PUBLIC_KEY => {
                let curve_oid = info
                    .algorithm
                    .parameters_oid()
                    .map_err(|e| SbomSigError::key_load(format!("missing EC curve parameters: {e}")))?;
                match curve_from_oid(curve_oid)? {
                    EcCurve::P256 => p256::SecretKey::from_pkcs8_der(der).map(Self::P256).map_err(invalid),
                    EcCurve::P384 => p384::SecretKey::from_pkcs8_der(der).map(Self::P384).map_err(invalid),
                    EcCurve::P521 => p521::SecretKey::from_pkcs8_der(der).map(Self::P521).map_err(invalid),
                }
            }
            OID_ED25519 => ed25519_dalek::SigningKey::from_pkcs8_der(der)
                .map(Self::Ed25519)
                .map_err(invalid),
            other => Err(SbomSigError::key_load(format!(
                "unsupported key type (algorithm OID {other})"
            ))),
        }
    }

    /// SEC1 `EC PRIVATE KEY`. The scalar width and the curve parameters (when
    /// present) select the curve.
    fn from_sec1_der(der: &[u8]) -> SbomSigResult<Self> {
        if let Ok(k) = p256::SecretKey::from_sec1_der(der) {
            return Ok(Self::P256(k));
        }
        if let Ok(k) = p384::SecretKey::from_sec1_der(der) {
            return Ok(Self::P384(k));
        }
        if let Ok(k) = p521::SecretKey::from_sec1_der(der) {
            return Ok(Self::P521(k));
        }
        Err(SbomSigError::key_load(
            "unsupported or unparsable SEC1 EC private key",
        ))
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::P256(_) | Self::P384(_) | Self::P521(_) => KeyFamily::Ec,
            Self::Ed25519(_) => KeyFamily::EdDsa,
        }
    }

    pub fn curve(&self) -> Option<EcCurve> {
        match self {
            Self::P256(_) => Some(EcCurve::P256),
            Self::P384(_) => Some(EcCurve::P384),
            Self::P521(_) => Some(EcCurve::P521),
            _ => None,
        }
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKeyMaterial {
        match self {
            Self::Rsa(k) => PublicKeyMaterial::Rsa(k.to_public_key()),
            Self::P256(k) => PublicKeyMaterial::P256(k.public_key()),
            Self::P384(k) => PublicKeyMaterial::P384(k.public_key()),
            Self::P521(k) => PublicKeyMaterial::P521(k.public_key()),
            Self::Ed25519(k) => PublicKeyMaterial::Ed25519(k.verifying_key()),
        }
    }

    /// Short description, e.g. `EC P-256`.
    pub fn describe(&self) -> String {
        describe(self.family(), self.curve())
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyMaterial")
            .field("type", &self.describe())
            .finish_non_exhaustive()
    }
}

impl PublicKeyMaterial {
    /// Parse the first public-key block of a PEM document.
    pub fn from_pem(input: &str) -> SbomSigResult<Self> {
        let block = pem::select_block(input, PUBLIC_LABELS)?;
        match block.tag() {
            "PUBLIC KEY" => Self::from_spki_der(block.contents()),
            "RSA PUBLIC KEY" => RsaPublicKey::from_pkcs1_der(block.contents())
                .map(Self::Rsa)
                .map_err(|e| SbomSigError::key_load(format!("invalid PKCS#1 RSA public key: {e}"))),
            other => Err(SbomSigError::key_load(format!("unsupported PEM label: {other}"))),
        }
    }

    /// Extract the subject public key of the first certificate in a PEM document.
    pub fn from_certificate_pem(input: &str) -> SbomSigResult<Self> {
        let block = pem::select_block(input, CERTIFICATE_LABELS)?;
        let cert = Certificate::from_der(block.contents())
            .map_err(|e| SbomSigError::key_load(format!("invalid certificate: {e}")))?;
        let spki = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| SbomSigError::key_load(format!("invalid certificate public key: {e}")))?;
        Self::from_spki_der(&spki)
    }

    /// Parse a DER `SubjectPublicKeyInfo`, dispatching on its algorithm OID.
    pub fn from_spki_der(der: &[u8]) -> SbomSigResult<Self> {
        let spki = SubjectPublicKeyInfoRef::from_der(der)
            .map_err(|e| SbomSigError::key_load(format!("invalid SubjectPublicKeyInfo: {e}")))?;
        let invalid = |e: pkcs8::spki::Error| SbomSigError::key_load(format!("invalid public key: {e}"));

        match spki.algorithm.oid {
            OID_RSA_ENCRYPTION => RsaPublicKey::from_public_key_der(der)
                .map(Self::Rsa)
                .map_err(invalid),
            OID_EC_PUBLIC_KEY => {
                let curve_oid = spki
                    .algorithm
                    .parameters_oid()
                    .map_err(|e| SbomSigError::key_load(format!("missing EC curve parameters: {e}")))?;
                match curve_from_oid(curve_oid)? {
                    EcCurve::P256 => p256::PublicKey::from_public_key_der(der).map(Self::P256).map_err(invalid),
                    EcCurve::P384 => p384::PublicKey::from_public_key_der(der).map(Self::P384).map_err(invalid),
                    EcCurve::P521 => p521::PublicKey::from_public_key_der(der).map(Self::P521).map_err(invalid),
                }
            }
            OID_ED25519 => ed25519_dalek::VerifyingKey::from_public_key_der(der)
                .map(Self::Ed25519)
                .map_err(invalid),
            other => Err(SbomSigError::key_load(format!(
                "unsupported key type (algorithm OID {other})"
            ))),
        }
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::P256(_) | Self::P384(_) | Self::P521(_) => KeyFamily::Ec,
            Self::Ed25519(_) => KeyFamily::EdDsa,
        }
    }

    pub fn curve(&self) -> Option<EcCurve> {
        match self {
            Self::P256(_) => Some(EcCurve::P256),
            Self::P384(_) => Some(EcCurve::P384),
            Self::P521(_) => Some(EcCurve::P521),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        describe(self.family(), self.curve())
    }

    /// DER `SubjectPublicKeyInfo` encoding.
    pub fn to_spki_der(&self) -> SbomSigResult<Vec<u8>> {
        let doc = match self {
            Self::Rsa(k) => k.to_public_key_der(),
            Self::P256(k) => k.to_public_key_der(),
            Self::P384(k) => k.to_public_key_der(),
            Self::P521(k) => k.to_public_key_der(),
            Self::Ed25519(k) => k.to_public_key_der(),
        }
        .map_err(|e| SbomSigError::invalid_argument(format!("failed to encode public key: {e}")))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Lowercase hex SHA-256 of the SPKI DER.
    pub fn fingerprint(&self) -> SbomSigResult<String> {
        Ok(sha256_hex(&self.to_spki_der()?))
    }
}

fn curve_from_oid(oid: ObjectIdentifier) -> SbomSigResult<EcCurve> {
    match oid {
        OID_PRIME256V1 => Ok(EcCurve::P256),
        OID_SECP384R1 => Ok(EcCurve::P384),
        OID_SECP521R1 => Ok(EcCurve::P521),
        other => Err(SbomSigError::key_load(format!(
            "unsupported key type (EC curve OID {other})"
        ))),
    }
}

fn describe(family: KeyFamily, curve: Option<EcCurve>) -> String {
    match curve {
        Some(c) => format!("{family} {}", c.as_str()),
        None => family.to_string(),
    }
}

fn read_pem_file(path: &Path, limits: &LimitsConfig) -> SbomSigResult<String> {
    let meta = fs::metadata(path)
        .map_err(|e| SbomSigError::key_load(format!("cannot open {}: {e}", path.display())))?;
    if meta.len() > limits.max_key_file_bytes {
        return Err(SbomSigError::key_load(format!(
            "{} is too large ({} bytes > limit {})",
            path.display(),
            meta.len(),
            limits.max_key_file_bytes
        )));
    }
    fs::read_to_string(path)
        .map_err(|e| SbomSigError::key_load(format!("cannot read {}: {e}", path.display())))
}

/// Load a private key from a PEM file. `password` decrypts an encrypted PKCS#8 key.
pub fn load_private_key(
    path: impl AsRef<Path>,
    password: Option<&str>,
    limits: &LimitsConfig,
) -> SbomSigResult<PrivateKeyMaterial> {
    let path = path.as_ref();
    let text = read_pem_file(path, limits)?;
    let key = match password {
        Some(pw) => PrivateKeyMaterial::from_pem_with_password(&text, pw.as_bytes())?,
        None => PrivateKeyMaterial::from_pem(&text)?,
    };
    tracing::debug!(path = %path.display(), key = %key.describe(), "loaded private key");
    Ok(key)
}

/// Load a public key from a PEM file.
pub fn load_public_key(path: impl AsRef<Path>, limits: &LimitsConfig) -> SbomSigResult<PublicKeyMaterial> {
    let path = path.as_ref();
    let key = PublicKeyMaterial::from_pem(&read_pem_file(path, limits)?)?;
    tracing::debug!(path = %path.display(), key = %key.describe(), "loaded public key");
    Ok(key)
}

/// Load the subject public key of a PEM X.509 certificate.
pub fn load_public_key_from_certificate(
    path: impl AsRef<Path>,
    limits: &LimitsConfig,
) -> SbomSigResult<PublicKeyMaterial> {
    let path = path.as_ref();
    let key = PublicKeyMaterial::from_certificate_pem(&read_pem_file(path, limits)?)?;
    tracing::debug!(path = %path.display(), key = %key.describe(), "loaded certificate public key");
    Ok(key)
}
