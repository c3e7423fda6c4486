//! Pure Ed25519. No prehash; the 64-byte signature is used as is.

use ed25519_dalek::Signature;
use signature::{Signer, Verifier};

use crate::codec::{check_fixed_len, AlgorithmCodec};
use crate::errors::{SbomSigError, SbomSigResult};
use crate::keys::{KeyFamily, PrivateKeyMaterial, PublicKeyMaterial};
use crate::model::SignatureAlgorithm;

#[derive(Debug, Clone, Copy, Default)]
pub struct EdDsaCodec;

impl AlgorithmCodec for EdDsaCodec {
    fn family(&self) -> KeyFamily {
        KeyFamily::EdDsa
    }

    fn sign(
        &self,
        alg: SignatureAlgorithm,
        key: &PrivateKeyMaterial,
        message: &[u8],
    ) -> SbomSigResult<Vec<u8>> {
        let PrivateKeyMaterial::Ed25519(k) = key else {
            return Err(wrong_key(alg, key.family()));
        };
        let sig = k
            .try_sign(message)
            .map_err(|e| SbomSigError::signing_backend(format!("Ed25519 signing failed: {e}")))?;
        Ok(sig.to_bytes().to_vec())
    }

    fn verify(
        &self,
        alg: SignatureAlgorithm,
        key: &PublicKeyMaterial,
        message: &[u8],
        signature: &[u8],
    ) -> SbomSigResult<bool> {
        let PublicKeyMaterial::Ed25519(k) = key else {
            return Err(wrong_key(alg, key.family()));
        };
        check_fixed_len(alg, signature)?;
        let sig = Signature::from_slice(signature)
            .map_err(|e| SbomSigError::malformed_signature(format!("invalid Ed25519 signature: {e}")))?;
        Ok(k.verify(message, &sig).is_ok())
    }
}

fn wrong_key(alg: SignatureAlgorithm, family: KeyFamily) -> SbomSigError {
    SbomSigError::unsupported_algorithm(format!("{alg} requires an Ed25519 key, got {family}"))
}
