mod cli;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging stays installed until main returns.
    let _log_guard = cli.init_logging();

    cli.run()
}
