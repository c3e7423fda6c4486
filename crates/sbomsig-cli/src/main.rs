use std::process::ExitCode;

use clap::Parser;

mod args;
mod cmd;
mod io;
mod logging;
mod output;

fn main() -> ExitCode {
    let cli = args::Cli::parse();
    output::init(cli.json);
    logging::init(cli.log_json);

    match cmd::dispatch(cli) {
        Ok(status) => status.into(),
        Err(e) => {
            output::error(&e);
            ExitCode::from(2)
        }
    }
}
