//! `devkit` command-line entry point.

use anyhow::Result;
use clap::Parser;

use devkit_cli::cli::{Cli, Command};
use devkit_cli::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber(args.verbose, args.command.name());
    let log = logging::Logger::new(args.command.name());

    match &args.command {
        Command::Setup(opts) => commands::setup::run(&args.global, opts, &log),
        Command::Update => commands::update::run(&args.global, &log),
        Command::EnableContainers(opts) => commands::containers::run(&args.global, opts, &log),
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::GetCert(opts) => commands::cert::run(&args.global, opts, &log),
        Command::Detect(opts) => commands::detect::run(&args.global, opts, &log),
        Command::Completions(opts) => {
            commands::completions::run(opts);
            Ok(())
        }
    }
}
