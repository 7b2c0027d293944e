//! `connectables` command-line entry point.
use anyhow::Result;
use clap::Parser;

use connectables::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        let version = option_env!("CONNECTABLES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        #[allow(clippy::print_stdout)]
        {
            println!("connectables {version}");
        }
        return Ok(());
    }

    let name = args.command.name();
    logging::init_subscriber(args.verbose, name);
    let log = logging::Logger::new(name);

    match args.command {
        cli::Command::List(opts) => commands::list::run(&args.global, &opts, &log),
        cli::Command::Actions(opts) => commands::actions::run(&args.global, &opts, &log),
        cli::Command::Run(opts) => commands::run::run(&args.global, &opts, &log),
        cli::Command::Check => commands::check::run(&args.global, &log),
        cli::Command::Version => Ok(()),
    }
}
