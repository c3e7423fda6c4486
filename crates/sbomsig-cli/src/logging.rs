use std::io;

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `SBOMSIG_LOG` wins over `RUST_LOG`; default `warn`.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_env("SBOMSIG_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
