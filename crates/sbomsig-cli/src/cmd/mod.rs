use std::process::ExitCode;

use anyhow::Result;

use crate::args::{Cli, Command};
use crate::io::input;

mod canonicalize;
mod inspect;
mod sign;
mod verify;

/// Command outcome mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Rejected,
}

impl From<Status> for ExitCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Success => ExitCode::SUCCESS,
            Status::Rejected => ExitCode::from(1),
        }
    }
}

pub fn dispatch(cli: Cli) -> Result<Status> {
    let cfg = input::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Sign {
            input,
            key,
            key_password_file,
            algorithm,
            key_id,
            key_id_from_fingerprint,
            no_public_key,
            out,
        } => sign::run(
            cfg,
            sign::SignArgs {
                input,
                key,
                key_password_file,
                algorithm,
                key_id,
                key_id_from_fingerprint,
                no_public_key,
                out,
            },
        ),
        Command::Verify {
            input,
            key,
            cert,
            trust_embedded_key,
            require_excludes,
            accept_der_ecdsa,
            strict_excludes,
        } => verify::run(
            cfg,
            verify::VerifyArgs {
                input,
                key,
                cert,
                trust_embedded_key,
                require_excludes,
                accept_der_ecdsa,
                strict_excludes,
            },
        ),
        Command::Canonicalize { input, out } => canonicalize::run(&cfg, &input, out.as_deref()),
        Command::Inspect { input, key } => inspect::run(&cfg, input.as_deref(), key.as_deref()),
    }
}
