//! `macsetup` binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use macsetup_cli::{cli, commands, error, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, Some(cli::Command::Version)) {
        commands::version::run();
        return ExitCode::SUCCESS;
    }

    logging::init_subscriber(args.verbose, "setup");
    let log = Arc::new(logging::Logger::new("setup"));

    match commands::setup::run(&args.global, &args.setup, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::from(error::exit_code_for(&e))
        }
    }
}
