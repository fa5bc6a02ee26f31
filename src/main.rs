use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use filepatch::cli::{Cli, Command};
use filepatch::commands;
use filepatch::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let command = args.command();

    if command == Command::Version {
        commands::version::run();
        return Ok(());
    }

    logging::init_subscriber(args.verbose, command.log_name());
    let log = Arc::new(Logger::new(command.log_name()));

    match command {
        Command::Build => commands::build::run(&args.global, &log),
        Command::Patch => commands::patch::run(&args.global, &log),
        Command::Restore => commands::restore::run(&args.global, &log),
        Command::Menu => commands::menu::run(&args.global, &log),
        Command::Version => Ok(()),
    }
}
