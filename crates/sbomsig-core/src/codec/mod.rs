//! Algorithm codecs.
//!
//! One `AlgorithmCodec` per key family, selected by `SignatureAlgorithm`:
//! - `RsaCodec`: RSASSA-PKCS1-v1_5 with SHA-256/384/512
//! - `EcdsaCodec`: ECDSA P-256/384/521, signatures as fixed-width `r || s`
//! - `EdDsaCodec`: pure Ed25519
//!
//! Codecs check that the key family (and curve) matches the algorithm before
//! touching the primitive. `verify` returns `Ok(false)` for a well-formed
//! signature that does not match; only malformed input is an `Err`.

pub mod ecdsa;
pub mod eddsa;
pub mod rsa;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::determinism::hashing::hash_bytes;
use crate::errors::{SbomSigError, SbomSigResult};
use crate::keys::{EcCurve, KeyFamily, PrivateKeyMaterial, PublicKeyMaterial};
use crate::model::SignatureAlgorithm;

pub use self::ecdsa::EcdsaCodec;
pub use self::eddsa::EdDsaCodec;
pub use self::rsa::RsaCodec;

/// Per-family sign/verify contract.
pub trait AlgorithmCodec: Send + Sync {
    fn family(&self) -> KeyFamily;

    /// Sign `message` (canonical bytes; hashing is part of the algorithm).
    fn sign(
        &self,
        alg: SignatureAlgorithm,
        key: &PrivateKeyMaterial,
        message: &[u8],
    ) -> SbomSigResult<Vec<u8>>;

    /// Check `signature` over `message`.
    fn verify(
        &self,
        alg: SignatureAlgorithm,
        key: &PublicKeyMaterial,
        message: &[u8],
        signature: &[u8],
    ) -> SbomSigResult<bool>;
}

static RSA: RsaCodec = RsaCodec;
static ECDSA: EcdsaCodec = EcdsaCodec;
static EDDSA: EdDsaCodec = EdDsaCodec;

/// The codec responsible for `alg`.
pub fn codec_for(alg: SignatureAlgorithm) -> &'static dyn AlgorithmCodec {
    match alg.family() {
        KeyFamily::Rsa => &RSA,
        KeyFamily::Ec => &ECDSA,
        KeyFamily::EdDsa => &EDDSA,
    }
}

/// Message digest for `alg`. Empty for Ed25519, which digests internally.
pub fn digest(alg: SignatureAlgorithm, message: &[u8]) -> Vec<u8> {
    match alg.digest() {
        Some(d) => hash_bytes(d, message),
        None => Vec::new(),
    }
}

/// Sign with the codec for `alg`.
pub fn sign(alg: SignatureAlgorithm, key: &PrivateKeyMaterial, message: &[u8]) -> SbomSigResult<Vec<u8>> {
    ensure_key_matches(alg, key.family(), key.curve())?;
    codec_for(alg).sign(alg, key, message)
}

/// Verify with the codec for `alg`.
pub fn verify(
    alg: SignatureAlgorithm,
    key: &PublicKeyMaterial,
    message: &[u8],
    signature: &[u8],
) -> SbomSigResult<bool> {
    ensure_key_matches(alg, key.family(), key.curve())?;
    codec_for(alg).verify(alg, key, message, signature)
}

/// `UnsupportedAlgorithm` unless a key of `family`/`curve` can serve `alg`.
pub fn ensure_key_matches(
    alg: SignatureAlgorithm,
    family: KeyFamily,
    curve: Option<EcCurve>,
) -> SbomSigResult<()> {
    if alg.family() != family {
        return Err(SbomSigError::unsupported_algorithm(format!(
            "{alg} requires a {} key, got {family}",
            alg.family()
        )));
    }
    if let (Some(want), Some(have)) = (alg.curve(), curve) {
        if want != have {
            return Err(SbomSigError::unsupported_algorithm(format!(
                "{alg} requires curve {}, key is on {}",
                want.as_str(),
                have.as_str()
            )));
        }
    }
    Ok(())
}

/// Fail with `MalformedSignature` unless `signature` has the algorithm's fixed length.
pub(crate) fn check_fixed_len(alg: SignatureAlgorithm, signature: &[u8]) -> SbomSigResult<()> {
    match alg.fixed_signature_len() {
        Some(want) if want != signature.len() => Err(SbomSigError::malformed_signature(format!(
            "{alg} signature must be {want} bytes, got {}",
            signature.len()
        ))),
        _ => Ok(()),
    }
}

/// base64url without padding.
pub fn encode_b64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Strict base64url decode (no padding, URL-safe alphabet only).
pub fn decode_b64url(s: &str) -> SbomSigResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| SbomSigError::malformed_signature(format!("invalid base64url: {e}")))
}
