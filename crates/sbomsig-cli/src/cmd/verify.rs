use anyhow::{bail, Context, Result};

use sbomsig_core::config::EngineConfig;
use sbomsig_core::pipeline::verify::{Verifier, VerifyLevel};

use crate::cmd::Status;
use crate::io::input;
use crate::output;

#[derive(Debug)]
pub struct VerifyArgs {
    pub input: String,
    pub key: Option<String>,
    pub cert: Option<String>,
    pub trust_embedded_key: bool,
    pub require_excludes: bool,
    pub accept_der_ecdsa: bool,
    pub strict_excludes: bool,
}

pub fn run(mut cfg: EngineConfig, args: VerifyArgs) -> Result<Status> {
    cfg.verify.trust_embedded_key |= args.trust_embedded_key;
    cfg.verify.require_excludes |= args.require_excludes;
    cfg.verify.accept_der_ecdsa |= args.accept_der_ecdsa;
    cfg.verify.strict_excludes |= args.strict_excludes;
    let trust_embedded = cfg.verify.trust_embedded_key;

    let mut verifier = Verifier::new(cfg);
    match (&args.key, &args.cert) {
        (Some(key), _) => verifier
            .load_public_key(key)
            .with_context(|| format!("cannot load public key {key}"))?,
        (None, Some(cert)) => verifier
            .load_public_key_from_certificate(cert)
            .with_context(|| format!("cannot load certificate {cert}"))?,
        (None, None) if trust_embedded => {}
        (None, None) => bail!("provide --key, --cert or --trust-embedded-key"),
    }

    let document = input::read_text(&args.input)?;
    let report = verifier.verify_report(&document);

    if output::is_json() {
        output::print(&report)?;
    } else {
        let alg = report
            .algorithm
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        output::verdict(report.ok, &format!("{} ({alg})", args.input))?;
        for f in &report.findings {
            let level = match f.level {
                VerifyLevel::Info => continue,
                VerifyLevel::Warning => "warning",
                VerifyLevel::Error => "error",
            };
            output::note(level, &format!("{}: {}", f.code, f.message))?;
        }
    }

    Ok(if report.ok { Status::Success } else { Status::Rejected })
}
