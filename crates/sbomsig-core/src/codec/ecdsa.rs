//! ECDSA over P-256, P-384 and P-521.
//!
//! Signatures travel as fixed-width big-endian `r || s` (64, 96 or 132 bytes).
//! The curve's standard digest is used: SHA-256, SHA-384, SHA-512 respectively.
//! `der_to_raw` converts an ASN.1 DER signature for legacy documents.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use signature::{Signer, Verifier};

use crate::codec::{check_fixed_len, AlgorithmCodec};
use crate::errors::{SbomSigError, SbomSigResult};
use crate::keys::{KeyFamily, PrivateKeyMaterial, PublicKeyMaterial};
use crate::model::{EcCurve, SignatureAlgorithm};

#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaCodec;

impl AlgorithmCodec for EcdsaCodec {
    fn family(&self) -> KeyFamily {
        KeyFamily::Ec
    }

    fn sign(
        &self,
        alg: SignatureAlgorithm,
        key: &PrivateKeyMaterial,
        message: &[u8],
    ) -> SbomSigResult<Vec<u8>> {
        let backend = |e: signature::Error| SbomSigError::signing_backend(format!("{alg} signing failed: {e}"));

        let raw = match (alg, key) {
            (SignatureAlgorithm::ES256, PrivateKeyMaterial::P256(k)) => {
                let sk = p256::ecdsa::SigningKey::from_slice(&k.to_bytes()).map_err(backend)?;
                let sig: p256::ecdsa::Signature = sk.try_sign(message).map_err(backend)?;
                sig.to_bytes().to_vec()
            }
            (SignatureAlgorithm::ES384, PrivateKeyMaterial::P384(k)) => {
                let sk = p384::ecdsa::SigningKey::from_slice(&k.to_bytes()).map_err(backend)?;
                let sig: p384::ecdsa::Signature = sk.try_sign(message).map_err(backend)?;
                sig.to_bytes().to_vec()
            }
            (SignatureAlgorithm::ES512, PrivateKeyMaterial::P521(k)) => {
                let sk = p521::ecdsa::SigningKey::from_slice(&k.to_bytes()).map_err(backend)?;
                let sig: p521::ecdsa::Signature = sk.try_sign(message).map_err(backend)?;
                sig.to_bytes().to_vec()
            }
            _ => return Err(wrong_key(alg, key.describe())),
        };

        check_fixed_len(alg, &raw)?;
        Ok(raw)
    }

    fn verify(
        &self,
        alg: SignatureAlgorithm,
        key: &PublicKeyMaterial,
        message: &[u8],
        signature: &[u8],
    ) -> SbomSigResult<bool> {
        check_fixed_len(alg, signature)?;
        let bad_key = |e: signature::Error| SbomSigError::key_load(format!("invalid EC public key: {e}"));

        let ok = match (alg, key) {
            (SignatureAlgorithm::ES256, PublicKeyMaterial::P256(k)) => {
                let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(k.to_encoded_point(false).as_bytes())
                    .map_err(bad_key)?;
                // Right width but r or s outside [1, n): no key can produce it.
                p256::ecdsa::Signature::from_slice(signature)
                    .is_ok_and(|sig| vk.verify(message, &sig).is_ok())
            }
            (SignatureAlgorithm::ES384, PublicKeyMaterial::P384(k)) => {
                let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(k.to_encoded_point(false).as_bytes())
                    .map_err(bad_key)?;
                // Right width but r or s outside [1, n): no key can produce it.
                p384::ecdsa::Signature::from_slice(signature)
                    .is_ok_and(|sig| vk.verify(message, &sig).is_ok())
            }
            (SignatureAlgorithm::ES512, PublicKeyMaterial::P521(k)) => {
                let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(k.to_encoded_point(false).as_bytes())
                    .map_err(bad_key)?;
                // Right width but r or s outside [1, n): no key can produce it.
                p521::ecdsa::Signature::from_slice(signature)
                    .is_ok_and(|sig| vk.verify(message, &sig).is_ok())
            }
            _ => return Err(wrong_key(alg, key.describe())),
        };

        Ok(ok)
    }
}

/// Convert an ASN.1 DER ECDSA signature into fixed-width `r || s` for `alg`.
pub fn der_to_raw(alg: SignatureAlgorithm, der: &[u8]) -> SbomSigResult<Vec<u8>> {
    let malformed = |e: signature::Error| SbomSigError::malformed_signature(format!("invalid DER {alg} signature: {e}"));
    match alg.curve() {
        Some(EcCurve::P256) => Ok(p256::ecdsa::Signature::from_der(der).map_err(malformed)?.to_bytes().to_vec()),
        Some(EcCurve::P384) => Ok(p384::ecdsa::Signature::from_der(der).map_err(malformed)?.to_bytes().to_vec()),
        Some(EcCurve::P521) => Ok(p521::ecdsa::Signature::from_der(der).map_err(malformed)?.to_bytes().to_vec()),
        None => Err(SbomSigError::unsupported_algorithm(format!("{alg} is not an ECDSA algorithm"))),
    }
}

fn wrong_key(alg: SignatureAlgorithm, key: String) -> SbomSigError {
    let want = alg.curve().map(|c| c.as_str()).unwrap_or("EC");
    SbomSigError::unsupported_algorithm(format!("{alg} requires an EC {want} key, got {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const P256: &str = include_str!("../../tests/fixtures/keys/ec_p256_private.pem");
    const P521: &str = include_str!("../../tests/fixtures/keys/ec_p521_private.pem");

    #[test]
    fn raw_signature_widths() {
        let k256 = PrivateKeyMaterial::from_pem(P256).unwrap();
        let k521 = PrivateKeyMaterial::from_pem(P521).unwrap();
        assert_eq!(EcdsaCodec.sign(SignatureAlgorithm::ES256, &k256, b"m").unwrap().len(), 64);
        assert_eq!(EcdsaCodec.sign(SignatureAlgorithm::ES512, &k521, b"m").unwrap().len(), 132);
    }

    #[test]
    fn verify_accepts_own_and_rejects_tampered() {
        let key = PrivateKeyMaterial::from_pem(P521).unwrap();
        let public = key.public_key();
        let sig = EcdsaCodec.sign(SignatureAlgorithm::ES512, &key, b"m").unwrap();
        assert!(EcdsaCodec.verify(SignatureAlgorithm::ES512, &public, b"m", &sig).unwrap());
        assert!(!EcdsaCodec.verify(SignatureAlgorithm::ES512, &public, b"n", &sig).unwrap());
    }

    #[test]
    fn wrong_length_is_malformed() {
        let key = PrivateKeyMaterial::from_pem(P256).unwrap();
        assert_matches!(
            EcdsaCodec.verify(SignatureAlgorithm::ES256, &key.public_key(), b"m", &[0u8; 70]),
            Err(SbomSigError::MalformedSignature(_))
        );
    }

    #[test]
    fn out_of_range_scalars_do_not_verify() {
        let key = PrivateKeyMaterial::from_pem(P256).unwrap().public_key();
        let zero = [0u8; 64];
        let above_order = [0xffu8; 64];
        assert!(!EcdsaCodec.verify(SignatureAlgorithm::ES256, &key, b"m", &zero).unwrap());
        assert!(!EcdsaCodec.verify(SignatureAlgorithm::ES256, &key, b"m", &above_order).unwrap());

        let key = PrivateKeyMaterial::from_pem(P521).unwrap().public_key();
        assert!(!EcdsaCodec.verify(SignatureAlgorithm::ES512, &key, b"m", &[0u8; 132]).unwrap());
    }

    #[test]
    fn der_converts_to_raw() {
        let key = PrivateKeyMaterial::from_pem(P256).unwrap();
        let raw = EcdsaCodec.sign(SignatureAlgorithm::ES256, &key, b"m").unwrap();
        let der = p256::ecdsa::Signature::from_slice(&raw).unwrap().to_der();
        assert_eq!(der_to_raw(SignatureAlgorithm::ES256, der.as_bytes()).unwrap(), raw);
        assert!(der_to_raw(SignatureAlgorithm::RS256, der.as_bytes()).is_err());
    }
}
