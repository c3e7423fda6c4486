//! cli.rs
//!
//! Black-box tests for the `sbomsig` binary:
//! exit code 0 = verified, 1 = rejected, 2 = error.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const SBOM: &str = r#"{
  "bomFormat": "CycloneDX",
  "specVersion": "1.5",
  "components": [
    { "name": "openssl", "version": "3.0.13" },
    { "name": "zlib", "version": "1.3.1" }
  ]
}"#;

fn key(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../sbomsig-core/tests/fixtures/keys")
        .join(name)
}

fn sbomsig() -> Command {
    let mut cmd = Command::cargo_bin("sbomsig").unwrap();
    cmd.env_remove("SBOMSIG_LOG").env_remove("RUST_LOG");
    cmd
}

fn write_sbom(dir: &TempDir) -> PathBuf {
    let p = dir.path().join("bom.json");
    fs::write(&p, SBOM).unwrap();
    p
}

fn sign(input: &Path, out: &Path, key_name: &str, alg: &str) {
    sbomsig()
        .arg("sign")
        .arg(input)
        .arg("--key")
        .arg(key(key_name))
        .args(["--algorithm", alg])
        .arg("--out")
        .arg(out)
        .assert()
        .success();
}

#[test]
fn sign_then_verify_exits_zero() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);
    let signed = dir.path().join("bom.signed.json");
    sign(&input, &signed, "ec_p256_private.pem", "ES256");

    let doc: Value = serde_json::from_str(&fs::read_to_string(&signed).unwrap()).unwrap();
    assert_eq!(doc["signature"]["algorithm"], "ES256");
    assert_eq!(doc["signature"]["excludes"][0], "signature");

    sbomsig()
        .arg("verify")
        .arg(&signed)
        .arg("--key")
        .arg(key("ec_p256_public.pem"))
        .assert()
        .code(0);
}

#[test]
fn tampered_document_exits_one() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);
    let signed = dir.path().join("bom.signed.json");
    sign(&input, &signed, "rsa_private.pem", "RS256");

    let tampered = fs::read_to_string(&signed).unwrap().replace("3.0.13", "3.0.14");
    fs::write(&signed, tampered).unwrap();

    sbomsig()
        .arg("verify")
        .arg(&signed)
        .arg("--key")
        .arg(key("rsa_public.pem"))
        .assert()
        .code(1);
}

#[test]
fn wrong_key_exits_one() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);
    let signed = dir.path().join("bom.signed.json");
    sign(&input, &signed, "ed25519_private.pem", "Ed25519");

    sbomsig()
        .arg("verify")
        .arg(&signed)
        .arg("--key")
        .arg(key("ed25519_other_public.pem"))
        .assert()
        .code(1);
}

#[test]
fn encrypted_key_signs_with_password_file() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);
    let signed = dir.path().join("bom.signed.json");

    sbomsig()
        .arg("sign")
        .arg(&input)
        .arg("--key")
        .arg(key("ec_p384_encrypted.pem"))
        .args(["--algorithm", "ES384"])
        .arg("--out")
        .arg(&signed)
        .assert()
        .code(2);

    sbomsig()
        .arg("sign")
        .arg(&input)
        .arg("--key")
        .arg(key("ec_p384_encrypted.pem"))
        .arg("--key-password-file")
        .arg(key("ec_p384_encrypted.pass"))
        .args(["--algorithm", "ES384"])
        .arg("--out")
        .arg(&signed)
        .assert()
        .success();

    sbomsig()
        .arg("verify")
        .arg(&signed)
        .arg("--key")
        .arg(key("ec_p384_public.pem"))
        .assert()
        .code(0);
}

#[test]
fn missing_key_file_exits_two() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);

    sbomsig()
        .arg("verify")
        .arg(&input)
        .arg("--key")
        .arg(dir.path().join("nope.pem"))
        .assert()
        .code(2);
}

#[test]
fn verify_without_key_source_exits_two() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);

    sbomsig().arg("verify").arg(&input).assert().code(2);
}

#[test]
fn json_verify_report_parses() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);
    let signed = dir.path().join("bom.signed.json");
    sign(&input, &signed, "ec_p384_private.pem", "ES384");

    let out = sbomsig()
        .arg("--json")
        .arg("verify")
        .arg(&signed)
        .arg("--key")
        .arg(key("ec_p384_public.pem"))
        .assert()
        .code(0)
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["ok"], true);
    assert_eq!(report["algorithm"], "ES384");
    assert!(report["findings"].as_array().unwrap().iter().any(|f| f["code"] == "signature.ok"));
}

#[test]
fn trust_embedded_key_verifies_without_key_flag() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);
    let signed = dir.path().join("bom.signed.json");
    sign(&input, &signed, "ed25519_private.pem", "Ed25519");

    sbomsig()
        .arg("verify")
        .arg(&signed)
        .arg("--trust-embedded-key")
        .assert()
        .code(0);
}

#[test]
fn canonicalize_prints_sorted_compact_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.json");
    fs::write(&input, r#"{ "b": 1, "a": [true, null], "signature": {"x": 1} }"#).unwrap();

    let out = sbomsig()
        .arg("canonicalize")
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(String::from_utf8(out).unwrap().trim_end(), r#"{"a":[true,null],"b":1}"#);
}

#[test]
fn inspect_key_reports_fingerprint() {
    let out = sbomsig()
        .arg("--json")
        .arg("inspect")
        .arg("--key")
        .arg(key("ec_p256_private.pem"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["key"]["source"], "private key");
    assert_eq!(v["key"]["jwk"]["crv"], "P-256");
    assert_eq!(v["key"]["fingerprint"].as_str().unwrap().len(), 64);
}

#[test]
fn inspect_document_reports_signed_digest() {
    let dir = TempDir::new().unwrap();
    let input = write_sbom(&dir);
    let signed = dir.path().join("bom.signed.json");
    sign(&input, &signed, "rsa_private.pem", "RS384");

    let out = sbomsig()
        .arg("--json")
        .arg("inspect")
        .arg(&signed)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: Value = serde_json::from_slice(&out).unwrap();
    let doc = &v["document"];
    assert_eq!(doc["signature"]["algorithm"], "RS384");
    assert_eq!(doc["discoveredExcludes"][0], "signature");
    let digest = doc["signedDigest"].as_str().unwrap();
    assert!(digest.starts_with("sha384:"), "{digest}");
    assert_eq!(digest.len(), "sha384:".len() + 96);
}
