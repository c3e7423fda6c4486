use anyhow::Result;
use serde::Serialize;

use sbomsig_core::config::EngineConfig;
use sbomsig_core::determinism::canonical_json::canonicalize;
use sbomsig_core::pipeline::parse::parse_document;

use crate::cmd::Status;
use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct CanonicalOut {
    pub sha256: String,
    pub length: usize,
    pub excludes: Vec<String>,
    pub canonical: String,
}

pub fn run(cfg: &EngineConfig, path: &str, out: Option<&str>) -> Result<Status> {
    let text = input::read_text(path)?;
    let doc = parse_document(&text, cfg.limits.max_document_bytes)?;
    let canonical = canonicalize(&doc);

    if let Some(out) = out {
        input::write_file(out, &canonical.bytes)?;
    }

    if output::is_json() {
        output::print(&CanonicalOut {
            sha256: canonical.sha256_hex(),
            length: canonical.bytes.len(),
            excludes: canonical.exclude_strings(),
            canonical: canonical.as_str().to_string(),
        })?;
    } else if let Some(out) = out {
        output::field("written", out)?;
        output::field("sha256", canonical.sha256_hex())?;
    } else {
        println!("{}", canonical.as_str());
    }
    Ok(Status::Success)
}
