//! Verification of signed documents.
//!
//! Steps:
//! - extract the top-level `signature` block
//! - resolve the verification key (loaded key, or the embedded JWK when trusted)
//! - remove the top-level block and replay every recorded exclusion path
//! - re-canonicalize; any `signature` still discovered was not recorded at
//!   signing time and rejects the document
//! - decode `value` and check it with the algorithm codec
//!
//! When the block has no `excludes`, canonicalization's own discovery pass is
//! used instead and the report carries an `excludes.missing` warning.
//!
//! `Verifier::verify` keeps the boolean contract and stores a `code: message`
//! diagnostic for the last rejection. `Verifier::verify_report` returns the
//! full list of findings. Neither panics or propagates errors for untrusted input.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::codec::{self, decode_b64url, ensure_key_matches};
use crate::config::EngineConfig;
use crate::determinism::canonical_json::canonicalize;
use crate::determinism::exclusion::ExclusionPath;
use crate::errors::{SbomSigError, SbomSigResult};
use crate::keys::{self, KeyFamily, PublicKeyMaterial};
use crate::model::{SignatureAlgorithm, SignatureInfo};
use crate::pipeline::envelope::{self, signature_from_value, strip_signature_value};
use crate::pipeline::parse::parse_document;
use crate::pipeline::KeyState;

/// A structured verification finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyFinding {
    pub level: VerifyLevel,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyLevel {
    Info,
    Warning,
    Error,
}

/// Verification report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    pub ok: bool,
    pub findings: Vec<VerifyFinding>,
    pub algorithm: Option<SignatureAlgorithm>,
    pub key_id: Option<String>,
    /// SHA-256 of the canonical bytes that were checked.
    pub canonical_sha256: Option<String>,
}

impl VerifyReport {
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| matches!(f.level, VerifyLevel::Error))
    }

    pub fn warnings(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f.level, VerifyLevel::Warning))
            .count()
    }

    /// The last error finding, which is the reason for rejection.
    pub fn error(&self) -> Option<&VerifyFinding> {
        self.findings
            .iter()
            .rev()
            .find(|f| matches!(f.level, VerifyLevel::Error))
    }

    /// `code: message` of the rejection.
    pub fn diagnostic(&self) -> Option<String> {
        self.error().map(|f| format!("{}: {}", f.code, f.message))
    }
}

fn push(
    findings: &mut Vec<VerifyFinding>,
    level: VerifyLevel,
    code: impl Into<String>,
    message: impl Into<String>,
) {
    findings.push(VerifyFinding {
        level,
        code: code.into(),
        message: message.into(),
        data: BTreeMap::new(),
    });
}

fn push_with(
    findings: &mut Vec<VerifyFinding>,
    level: VerifyLevel,
    code: impl Into<String>,
    message: impl Into<String>,
    data: impl IntoIterator<Item = (&'static str, String)>,
) {
    findings.push(VerifyFinding {
        level,
        code: code.into(),
        message: message.into(),
        data: data.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    });
}

/// What the checks learned before succeeding or failing.
#[derive(Debug, Default)]
struct Outcome {
    algorithm: Option<SignatureAlgorithm>,
    key_id: Option<String>,
    canonical_sha256: Option<String>,
}

/// Verifies documents against one public key.
///
/// `Unloaded -> KeyLoaded`, then each `verify` call ends in verified or
/// rejected and leaves the instance reusable.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: EngineConfig,
    key: KeyState<PublicKeyMaterial>,
    last_error: Option<String>,
}

impl Verifier {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            key: KeyState::Unloaded,
            last_error: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load the verification key from a PEM public key file.
    pub fn load_public_key(&mut self, path: impl AsRef<Path>) -> SbomSigResult<()> {
        let loaded = keys::load_public_key(path, &self.config.limits);
        self.key.store(loaded)
    }

    /// Load the verification key from a PEM X.509 certificate.
    pub fn load_public_key_from_certificate(&mut self, path: impl AsRef<Path>) -> SbomSigResult<()> {
        let loaded = keys::load_public_key_from_certificate(path, &self.config.limits);
        self.key.store(loaded)
    }

    /// Load the verification key from a private key file (its public half is kept).
    pub fn load_private_key(&mut self, path: impl AsRef<Path>, password: Option<&str>) -> SbomSigResult<()> {
        let loaded = keys::load_private_key(path, password, &self.config.limits).map(|k| k.public_key());
        self.key.store(loaded)
    }

    pub fn set_public_key(&mut self, key: PublicKeyMaterial) {
        let _ = self.key.store(Ok(key));
    }

    pub fn has_key(&self) -> bool {
        self.key.is_loaded()
    }

    pub fn public_key(&self) -> SbomSigResult<&PublicKeyMaterial> {
        self.key.get()
    }

    /// Diagnostic of the last rejected `verify` call, `None` after a success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Read the top-level signature block of `document`.
    pub fn extract_signature(&self, document: &str) -> SbomSigResult<SignatureInfo> {
        let doc = parse_document(document, self.config.limits.max_document_bytes)?;
        signature_from_value(&doc)
    }

    /// True when `document` carries a valid signature for the loaded key.
    pub fn verify(&mut self, document: &str) -> bool {
        let report = self.verify_report(document);
        self.last_error = report.diagnostic();
        report.ok
    }

    /// Verify and return every finding.
    pub fn verify_report(&self, document: &str) -> VerifyReport {
        let mut findings = Vec::new();
        let mut outcome = Outcome::default();

        match self.check(document, &mut findings, &mut outcome) {
            Ok(()) => {
                tracing::info!(
                    algorithm = ?outcome.algorithm,
                    key_id = ?outcome.key_id,
                    "signature verified"
                );
                push(&mut findings, VerifyLevel::Info, "signature.ok", "signature verified");
            }
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "signature rejected");
                push(&mut findings, VerifyLevel::Error, e.code(), e.to_string());
            }
        }

        let mut report = VerifyReport {
            ok: false,
            findings,
            algorithm: outcome.algorithm,
            key_id: outcome.key_id,
            canonical_sha256: outcome.canonical_sha256,
        };
        report.ok = !report.has_errors();
        report
    }

    fn check(
        &self,
        document: &str,
        findings: &mut Vec<VerifyFinding>,
        outcome: &mut Outcome,
    ) -> SbomSigResult<()> {
        let mut doc = parse_document(document, self.config.limits.max_document_bytes)?;
        let info = signature_from_value(&doc)?;
        outcome.algorithm = Some(info.algorithm);
        outcome.key_id = info.key_id.clone();

        let key = self.resolve_key(&info, findings)?;
        ensure_key_matches(info.algorithm, key.family(), key.curve())?;

        strip_signature_value(&mut doc);

        let recorded = match &info.excludes {
            Some(list) => {
                let mut replayed = 0usize;
                for raw in list {
                    let path = ExclusionPath::parse(raw)?;
                    if path.is_top_level_signature() {
                        continue;
                    }
                    match path.remove_from(&mut doc) {
                        Ok(_) => replayed += 1,
                        Err(e) if self.config.verify.strict_excludes => return Err(e),
                        // Discovery below still drops any signature field, so an
                        // unresolved path cannot change the signed bytes.
                        Err(e) => {
                            tracing::warn!(path = %path, error = %e, "recorded exclusion did not resolve");
                            push_with(
                                findings,
                                VerifyLevel::Warning,
                                "excludes.unresolved",
                                "recorded exclusion no longer points at a signature field",
                                [("path", path.to_string())],
                            );
                        }
                    }
                }
                push(
                    findings,
                    VerifyLevel::Info,
                    "excludes.replayed",
                    format!("replayed {replayed} nested exclusion(s)"),
                );
                true
            }
            None if self.config.verify.require_excludes => {
                return Err(SbomSigError::malformed_signature(
                    "signature block has no excludes and the policy requires them",
                ));
            }
            None => {
                tracing::warn!("signature block has no excludes; falling back to discovery");
                push(
                    findings,
                    VerifyLevel::Warning,
                    "excludes.missing",
                    "signature block has no excludes; every signature field was excluded by discovery",
                );
                false
            }
        };

        let canonical = canonicalize(&doc);
        if recorded {
            let strict = self.config.verify.strict_excludes;
            let level = if strict { VerifyLevel::Error } else { VerifyLevel::Warning };
            for path in &canonical.excludes {
                push_with(
                    findings,
                    level,
                    "excludes.unrecorded",
                    "signature field not covered by the recorded excludes",
                    [("path", path.to_string())],
                );
            }
            if let (true, Some(path)) = (strict, canonical.excludes.first()) {
                return Err(SbomSigError::mismatch(format!(
                    "signature field at {path} was not excluded when the document was signed"
                )));
            }
        }
        outcome.canonical_sha256 = Some(canonical.sha256_hex());

        let signature = self.signature_bytes(&info, findings)?;
        if !codec::verify(info.algorithm, key.as_ref(), &canonical.bytes, &signature)? {
            return Err(SbomSigError::mismatch(
                "signature does not match the document content or key",
            ));
        }
        Ok(())
    }

    /// The loaded key, or the embedded one when policy allows and nothing is loaded.
    fn resolve_key<'a>(
        &'a self,
        info: &SignatureInfo,
        findings: &mut Vec<VerifyFinding>,
    ) -> SbomSigResult<Cow<'a, PublicKeyMaterial>> {
        match self.key.get() {
            Ok(loaded) => {
                if let Some(jwk) = &info.public_key {
                    match PublicKeyMaterial::from_jwk(jwk) {
                        Ok(embedded) if embedded != *loaded => push(
                            findings,
                            VerifyLevel::Warning,
                            "key.embedded.mismatch",
                            "embedded publicKey differs from the loaded key; the loaded key is used",
                        ),
                        Ok(_) => {}
                        Err(e) => push(
                            findings,
                            VerifyLevel::Warning,
                            "key.embedded.invalid",
                            format!("embedded publicKey ignored: {e}"),
                        ),
                    }
                }
                Ok(Cow::Borrowed(loaded))
            }
            Err(SbomSigError::NoKeyLoaded) if self.config.verify.trust_embedded_key => {
                let jwk = info.public_key.as_ref().ok_or(SbomSigError::NoKeyLoaded)?;
                let embedded = PublicKeyMaterial::from_jwk(jwk)?;
                push(
                    findings,
                    VerifyLevel::Warning,
                    "key.embedded.used",
                    "verified against the document's own publicKey; this proves integrity, not origin",
                );
                Ok(Cow::Owned(embedded))
            }
            Err(e) => Err(e),
        }
    }

    fn signature_bytes(
        &self,
        info: &SignatureInfo,
        findings: &mut Vec<VerifyFinding>,
    ) -> SbomSigResult<Vec<u8>> {
        let raw = decode_b64url(&info.value)?;
        let alg = info.algorithm;

        let fixed_len = alg.fixed_signature_len();
        let legacy_der = self.config.verify.accept_der_ecdsa
            && alg.family() == KeyFamily::Ec
            && fixed_len.is_some_and(|n| n != raw.len());
        if legacy_der {
            let converted = codec::ecdsa::der_to_raw(alg, &raw)?;
            push(
                findings,
                VerifyLevel::Info,
                "signature.der",
                "ECDSA signature was DER encoded and converted to r||s",
            );
            return Ok(converted);
        }
        Ok(raw)
    }
}

/// One-shot verification of `document` against `key`.
pub fn verify_document(document: &str, key: &PublicKeyMaterial, config: &EngineConfig) -> VerifyReport {
    let mut v = Verifier::new(config.clone());
    v.set_public_key(key.clone());
    v.verify_report(document)
}

/// Read the top-level signature block of `document`.
pub fn extract_signature(document: &str) -> SbomSigResult<SignatureInfo> {
    envelope::extract_signature(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PrivateKeyMaterial;
    use crate::pipeline::sign::Signer;
    use serde_json::{json, Value};

    const ED_KEY: &str = include_str!("../../tests/fixtures/keys/ed25519_private.pem");

    fn signed(doc: &str) -> (String, PublicKeyMaterial) {
        let key = PrivateKeyMaterial::from_pem(ED_KEY).unwrap();
        let public = key.public_key();
        let mut s = Signer::new(EngineConfig::default());
        s.set_private_key(key);
        let (_, out) = s.sign_and_embed(doc, SignatureAlgorithm::Ed25519, Some("k")).unwrap();
        (out, public)
    }

    fn verifier(key: PublicKeyMaterial) -> Verifier {
        let mut v = Verifier::new(EngineConfig::default());
        v.set_public_key(key);
        v
    }

    #[test]
    fn report_for_valid_document() {
        let (doc, key) = signed(r#"{"a":1}"#);
        let report = verifier(key).verify_report(&doc);
        assert!(report.ok, "{report:?}");
        assert_eq!(report.algorithm, Some(SignatureAlgorithm::Ed25519));
        assert_eq!(report.key_id.as_deref(), Some("k"));
        assert_eq!(report.canonical_sha256.as_ref().map(String::len), Some(64));
        assert!(report.diagnostic().is_none());
    }

    #[test]
    fn last_error_is_set_and_cleared() {
        let (doc, key) = signed(r#"{"a":1}"#);
        let mut v = verifier(key);
        assert!(!v.verify(r#"{"a":1}"#));
        assert!(v.last_error().unwrap().starts_with("MissingSignature"));
        assert!(v.verify(&doc));
        assert!(v.last_error().is_none());
    }

    #[test]
    fn no_key_is_a_diagnostic_not_a_panic() {
        let (doc, _) = signed(r#"{"a":1}"#);
        let mut v = Verifier::new(EngineConfig::default());
        assert!(!v.verify(&doc));
        assert!(v.last_error().unwrap().starts_with("NoKeyLoaded"));
        assert!(!v.verify("{{{"));
        assert!(v.last_error().unwrap().starts_with("ParseError"));
    }

    fn strict() -> EngineConfig {
        let mut cfg = EngineConfig::default();
        cfg.verify.strict_excludes = true;
        cfg
    }

    #[test]
    fn signature_inserted_after_signing_warns_or_rejects_by_policy() {
        let (doc, key) = signed(r#"{"components":[{"name":"a"}]}"#);
        let mut v: Value = serde_json::from_str(&doc).unwrap();
        v["components"][0]["signature"] = json!({"value": "sneaky"});
        let doc = v.to_string();

        let report = verifier(key.clone()).verify_report(&doc);
        assert!(report.ok, "{report:?}");
        let finding = report
            .findings
            .iter()
            .find(|f| f.code == "excludes.unrecorded")
            .unwrap();
        assert_eq!(finding.level, VerifyLevel::Warning);
        assert_eq!(finding.data["path"], "components[0].signature");

        let report = verify_document(&doc, &key, &strict());
        assert!(!report.ok);
        assert_eq!(report.error().map(|f| f.code.as_str()), Some("VerificationMismatch"));
    }

    #[test]
    fn unresolvable_recorded_path_warns_or_rejects_by_policy() {
        let (doc, key) = signed(r#"{"components":[{"name":"a","signature":1}]}"#);
        let mut v: Value = serde_json::from_str(&doc).unwrap();
        v["components"][0].as_object_mut().unwrap().remove("signature");
        let doc = v.to_string();

        let report = verifier(key.clone()).verify_report(&doc);
        assert!(report.ok, "{report:?}");
        assert!(report
            .findings
            .iter()
            .any(|f| f.code == "excludes.unresolved" && f.level == VerifyLevel::Warning));

        let report = verify_document(&doc, &key, &strict());
        assert_eq!(report.error().map(|f| f.code.as_str()), Some("InvalidExclusionPath"));
    }

    #[test]
    fn missing_excludes_warns_or_rejects_by_policy() {
        let (doc, key) = signed(r#"{"components":[{"signature":1}]}"#);
        let mut v: Value = serde_json::from_str(&doc).unwrap();
        v["signature"].as_object_mut().unwrap().remove("excludes");
        let doc = v.to_string();

        let report = verifier(key.clone()).verify_report(&doc);
        assert!(report.ok);
        assert_eq!(report.warnings(), 1);
        assert!(report.findings.iter().any(|f| f.code == "excludes.missing"));

        let mut cfg = EngineConfig::default();
        cfg.verify.require_excludes = true;
        let report = verify_document(&doc, &key, &cfg);
        assert!(!report.ok);
        assert_eq!(report.error().map(|f| f.code.as_str()), Some("MalformedSignature"));
    }

    #[test]
    fn embedded_key_requires_trust() {
        let (doc, _) = signed(r#"{"a":1}"#);
        let mut v = Verifier::new(EngineConfig::default());
        assert!(!v.verify(&doc));

        let mut cfg = EngineConfig::default();
        cfg.verify.trust_embedded_key = true;
        let mut v = Verifier::new(cfg);
        let report = v.verify_report(&doc);
        assert!(report.ok);
        assert!(report.findings.iter().any(|f| f.code == "key.embedded.used"));
        assert!(v.verify(&doc));
    }

    #[test]
    fn finding_levels_serialize_lowercase() {
        let f = VerifyFinding {
            level: VerifyLevel::Warning,
            code: "x".to_string(),
            message: "y".to_string(),
            data: BTreeMap::new(),
        };
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v["level"], "warning");
        assert!(v.get("data").is_none());
    }
}
