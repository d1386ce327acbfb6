mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    commands::init_tracing(cli.verbose);
    let operation = cli.command.operation();
    match commands::run_from_root(&cli.root, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report_error(operation, &err);
            ExitCode::FAILURE
        }
    }
}
