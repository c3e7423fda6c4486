use clap::{Parser, Subcommand};

use sbomsig_core::model::SignatureAlgorithm;

#[derive(Parser, Debug, Clone)]
#[command(name = "sbomsig", version, about = "Sign and verify SBOM documents")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Engine configuration file (JSON). Flags override its values.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Write logs to stderr as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign a document and embed the signature block.
    Sign {
        /// Document path, or `-` for stdin.
        input: String,

        /// Private key (PEM).
        #[arg(long)]
        key: String,

        /// File holding the password of an encrypted private key (first line).
        #[arg(long)]
        key_password_file: Option<String>,

        /// RS256|RS384|RS512|ES256|ES384|ES512|Ed25519 (default from config).
        #[arg(long)]
        algorithm: Option<SignatureAlgorithm>,

        /// Opaque key identifier stored as `keyId`.
        #[arg(long, conflicts_with = "key_id_from_fingerprint")]
        key_id: Option<String>,

        /// Use the SHA-256 fingerprint of the public key as `keyId`.
        #[arg(long)]
        key_id_from_fingerprint: bool,

        /// Do not embed the public key as `publicKey`.
        #[arg(long)]
        no_public_key: bool,

        /// Write the signed document here instead of stdout.
        #[arg(long)]
        out: Option<String>,
    },

    /// Verify a signed document. Exit code 0 = verified, 1 = rejected.
    Verify {
        /// Document path, or `-` for stdin.
        input: String,

        /// Public key (PEM).
        #[arg(long, conflicts_with = "cert")]
        key: Option<String>,

        /// X.509 certificate (PEM) carrying the public key.
        #[arg(long)]
        cert: Option<String>,

        /// Fall back to the document's embedded `publicKey` (integrity only).
        #[arg(long)]
        trust_embedded_key: bool,

        /// Reject signature blocks without `excludes`.
        #[arg(long)]
        require_excludes: bool,

        /// Also accept ASN.1 DER ECDSA signatures.
        #[arg(long)]
        accept_der_ecdsa: bool,

        /// Reject stale recorded excludes and signature fields added after signing.
        #[arg(long)]
        strict_excludes: bool,
    },

    /// Print the canonical form that gets signed.
    Canonicalize {
        /// Document path, or `-` for stdin.
        input: String,

        /// Write canonical bytes here instead of stdout.
        #[arg(long)]
        out: Option<String>,
    },

    /// Show a document's signature block and/or a key's details.
    Inspect {
        /// Document path, or `-` for stdin.
        input: Option<String>,

        /// Key or certificate (PEM) to describe.
        #[arg(long)]
        key: Option<String>,
    },
}
