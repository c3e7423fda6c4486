use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use sbomsig_core::config::{validate_config, EngineConfig};

/// Read a document as text; `-` reads stdin.
pub fn read_text(input: &str) -> Result<String> {
    if input == "-" {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s).context("failed to read stdin")?;
        return Ok(s);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
}

pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let v: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid json in {}: {e}", path.display()))?;
    Ok(v)
}

/// First line of a password file, without its line terminator.
pub fn read_password_file(path: &str) -> Result<String> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read password file {path}"))?;
    Ok(raw.lines().next().unwrap_or_default().to_string())
}

/// Engine configuration from an optional JSON file, validated.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    let cfg = match path {
        Some(p) => serde_json::from_value(read_json_file(p)?)
            .map_err(|e| anyhow!("invalid config {p}: {e}"))?,
        None => EngineConfig::default(),
    };
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_file(path: &str, bytes: &[u8]) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
