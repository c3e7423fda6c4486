//! Deterministic hashing utilities.
//!
//! All digests are explicitly parameterized by `DigestAlg`. No implicit defaults:
//! callers derive the digest from the `SignatureAlgorithm` they sign with.
//!
//! Supported algorithms:
//! - sha256
//! - sha384
//! - sha512

use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::model::DigestAlg;

/// Hash raw bytes using the selected algorithm.
pub fn hash_bytes(alg: DigestAlg, bytes: &[u8]) -> Vec<u8> {
    match alg {
        DigestAlg::Sha256 => Sha256::digest(bytes).to_vec(),
        DigestAlg::Sha384 => Sha384::digest(bytes).to_vec(),
        DigestAlg::Sha512 => Sha512::digest(bytes).to_vec(),
    }
}

/// SHA-256 of raw bytes as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(hash_bytes(DigestAlg::Sha256, bytes))
}
