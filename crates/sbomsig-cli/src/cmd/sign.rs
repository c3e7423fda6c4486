use anyhow::{Context, Result};
use serde::Serialize;

use sbomsig_core::config::EngineConfig;
use sbomsig_core::model::{SignatureAlgorithm, SignatureInfo};
use sbomsig_core::pipeline::sign::Signer;

use crate::cmd::Status;
use crate::io::input;
use crate::output;

#[derive(Debug)]
pub struct SignArgs {
    pub input: String,
    pub key: String,
    pub key_password_file: Option<String>,
    pub algorithm: Option<SignatureAlgorithm>,
    pub key_id: Option<String>,
    pub key_id_from_fingerprint: bool,
    pub no_public_key: bool,
    pub out: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignOut<'a> {
    pub ok: bool,
    pub out: &'a str,
    pub signature: &'a SignatureInfo,
}

pub fn run(mut cfg: EngineConfig, args: SignArgs) -> Result<Status> {
    if args.no_public_key {
        cfg.signing.embed_public_key = false;
    }
    let algorithm = args.algorithm.unwrap_or(cfg.signing.default_algorithm);

    let password = args
        .key_password_file
        .as_deref()
        .map(input::read_password_file)
        .transpose()?;

    let mut signer = Signer::new(cfg);
    signer
        .load_private_key(&args.key, password.as_deref())
        .with_context(|| format!("cannot load signing key {}", args.key))?;

    let key_id = if args.key_id_from_fingerprint {
        Some(signer.public_key()?.fingerprint()?)
    } else {
        args.key_id
    };

    let document = input::read_text(&args.input)?;
    let (info, signed) = signer
        .sign_and_embed(&document, algorithm, key_id.as_deref())
        .with_context(|| format!("cannot sign {}", args.input))?;

    let Some(out) = args.out.as_deref() else {
        println!("{signed}");
        return Ok(Status::Success);
    };

    input::write_file(out, format!("{signed}\n").as_bytes())?;
    if output::is_json() {
        output::print(&SignOut {
            ok: true,
            out,
            signature: &info,
        })?;
    } else {
        output::field("signed", out)?;
        output::field("algorithm", info.algorithm)?;
        if let Some(id) = &info.key_id {
            output::field("keyId", id)?;
        }
        output::field("excludes", info.excludes.as_deref().unwrap_or_default().join(", "))?;
    }
    Ok(Status::Success)
}
