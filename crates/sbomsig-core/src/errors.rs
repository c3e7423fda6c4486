//! Error types for sbomsig-core.
//!
//! Every failure category surfaced by signing, key loading, and verification maps
//! to one variant. `code()` returns a stable identifier that CLI output and
//! verifier diagnostics use as a prefix.

use thiserror::Error;

pub type SbomSigResult<T> = Result<T, SbomSigError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SbomSigError {
    /// Bad path, unparsable key material, or unsupported key type.
    #[error("key load failed: {reason}")]
    KeyLoad { reason: String },

    /// Input is not valid JSON (or exceeds the configured size limit).
    #[error("parse error: {0}")]
    Parse(String),

    /// The key family cannot produce or check the requested algorithm.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The underlying crypto primitive failed.
    #[error("signing backend error: {0}")]
    SigningBackend(String),

    /// The document carries no top-level signature block.
    #[error("no signature found in document")]
    MissingSignature,

    /// Well-formed signature that does not match the content or key.
    #[error("signature verification failed: {0}")]
    VerificationMismatch(String),

    /// An operation needed a key and none was loaded.
    #[error("no key loaded")]
    NoKeyLoaded,

    /// Signature bytes are not decodable for the algorithm (bad base64, wrong length).
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// An exclusion path is syntactically invalid or does not resolve.
    #[error("invalid exclusion path: {0}")]
    InvalidExclusionPath(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SbomSigError {
    pub fn key_load(reason: impl Into<String>) -> Self {
        Self::KeyLoad {
            reason: reason.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn unsupported_algorithm(msg: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(msg.into())
    }

    pub fn signing_backend(msg: impl Into<String>) -> Self {
        Self::SigningBackend(msg.into())
    }

    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::VerificationMismatch(msg.into())
    }

    pub fn malformed_signature(msg: impl Into<String>) -> Self {
        Self::MalformedSignature(msg.into())
    }

    pub fn invalid_exclusion_path(msg: impl Into<String>) -> Self {
        Self::InvalidExclusionPath(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Stable machine-readable code for this error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeyLoad { .. } => "KeyLoadError",
            Self::Parse(_) => "ParseError",
            Self::UnsupportedAlgorithm(_) => "UnsupportedAlgorithm",
            Self::SigningBackend(_) => "SigningBackendError",
            Self::MissingSignature => "MissingSignature",
            Self::VerificationMismatch(_) => "VerificationMismatch",
            Self::NoKeyLoaded => "NoKeyLoaded",
            Self::MalformedSignature(_) => "MalformedSignature",
            Self::InvalidExclusionPath(_) => "InvalidExclusionPath",
            Self::InvalidArgument(_) => "InvalidArgument",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(SbomSigError::MissingSignature.code(), "MissingSignature");
        assert_eq!(SbomSigError::key_load("x").code(), "KeyLoadError");
        assert_eq!(SbomSigError::parse("x").code(), "ParseError");
    }
}
