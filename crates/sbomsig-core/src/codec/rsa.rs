//! RSASSA-PKCS1-v1_5.

use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::traits::PublicKeyParts;
use sha2::{Sha256, Sha384, Sha512};
use signature::{SignatureEncoding, Signer, Verifier};

use crate::codec::AlgorithmCodec;
use crate::errors::{SbomSigError, SbomSigResult};
use crate::keys::{KeyFamily, PrivateKeyMaterial, PublicKeyMaterial};
use crate::model::{DigestAlg, SignatureAlgorithm};

#[derive(Debug, Clone, Copy, Default)]
pub struct RsaCodec;

impl AlgorithmCodec for RsaCodec {
    fn family(&self) -> KeyFamily {
        KeyFamily::Rsa
    }

    fn sign(
        &self,
        alg: SignatureAlgorithm,
        key: &PrivateKeyMaterial,
        message: &[u8],
    ) -> SbomSigResult<Vec<u8>> {
        let PrivateKeyMaterial::Rsa(k) = key else {
            return Err(wrong_key(alg, key.family()));
        };
        let k = k.as_ref().clone();

        let sig = match digest_of(alg)? {
            DigestAlg::Sha256 => SigningKey::<Sha256>::new(k).try_sign(message),
            DigestAlg::Sha384 => SigningKey::<Sha384>::new(k).try_sign(message),
            DigestAlg::Sha512 => SigningKey::<Sha512>::new(k).try_sign(message),
        }
        .map_err(|e| SbomSigError::signing_backend(format!("{alg} signing failed: {e}")))?;

        Ok(sig.to_vec())
    }

    fn verify(
        &self,
        alg: SignatureAlgorithm,
        key: &PublicKeyMaterial,
        message: &[u8],
        signature: &[u8],
    ) -> SbomSigResult<bool> {
        let PublicKeyMaterial::Rsa(k) = key else {
            return Err(wrong_key(alg, key.family()));
        };

        // PKCS#1 signatures are exactly the modulus length.
        if signature.len() != k.size() {
            return Err(SbomSigError::malformed_signature(format!(
                "{alg} signature must be {} bytes for this key, got {}",
                k.size(),
                signature.len()
            )));
        }
        let sig = Signature::try_from(signature)
            .map_err(|e| SbomSigError::malformed_signature(format!("invalid RSA signature: {e}")))?;

        let ok = match digest_of(alg)? {
            DigestAlg::Sha256 => VerifyingKey::<Sha256>::new(k.clone()).verify(message, &sig),
            DigestAlg::Sha384 => VerifyingKey::<Sha384>::new(k.clone()).verify(message, &sig),
            DigestAlg::Sha512 => VerifyingKey::<Sha512>::new(k.clone()).verify(message, &sig),
        }
        .is_ok();

        Ok(ok)
    }
}

fn digest_of(alg: SignatureAlgorithm) -> SbomSigResult<DigestAlg> {
    alg.digest()
        .ok_or_else(|| SbomSigError::unsupported_algorithm(format!("{alg} is not an RSA algorithm")))
}

fn wrong_key(alg: SignatureAlgorithm, family: KeyFamily) -> SbomSigError {
    SbomSigError::unsupported_algorithm(format!("{alg} requires an RSA key, got {family}"))
}
