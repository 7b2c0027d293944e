//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the connectables launcher.
#[derive(Parser, Debug)]
#[command(
    name = "connectables",
    about = "Launch user-configured actions on connectable devices",
    version
)]
pub struct Cli {
    #[allow(missing_docs)]
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Base configuration directory (default: $XDG_CONFIG_HOME or ~/.config)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_root: Option<PathBuf>,

    /// Print what would be launched without launching it
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured devices
    List(ListOpts),
    /// List the actions of a device
    Actions(ActionsOpts),
    /// Activate an action on a device
    Run(RunOpts),
    /// Validate every device and action file
    Check,
    /// Print version information
    Version,
}

impl Command {
    /// Short name used for the per-command log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Actions(_) => "actions",
            Self::Run(_) => "run",
            Self::Check => "check",
            Self::Version => "version",
        }
    }
}

/// Options for the `list` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ListOpts {
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Options for the `actions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ActionsOpts {
    /// Device identifier (device file name without extension)
    pub device: String,

    /// Order by rank, highest first, instead of declared order
    #[arg(long)]
    pub by_rank: bool,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Options for the `run` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RunOpts {
    /// Device identifier
    pub device: String,

    /// Action identifier, as listed in the device's `actions`
    pub action: String,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_list_json() {
        let cli = Cli::parse_from(["connectables", "list", "--json"]);
        assert!(matches!(cli.command, Command::List(ListOpts { json: true })));
    }

    #[test]
    fn parse_actions_by_rank() {
        let cli = Cli::parse_from(["connectables", "actions", "nas", "--by-rank"]);
        assert!(
            matches!(&cli.command, Command::Actions(_)),
            "Expected Actions command"
        );
        if let Command::Actions(opts) = cli.command {
            assert_eq!(opts.device, "nas");
            assert!(opts.by_rank);
            assert!(!opts.json);
        }
    }

    #[test]
    fn parse_run() {
        let cli = Cli::parse_from(["connectables", "run", "nas", "mount"]);
        assert!(matches!(&cli.command, Command::Run(_)), "Expected Run command");
        if let Command::Run(opts) = cli.command {
            assert_eq!(opts.device, "nas");
            assert_eq!(opts.action, "mount");
        }
    }

    #[test]
    fn parse_run_requires_action() {
        assert!(Cli::try_parse_from(["connectables", "run", "nas"]).is_err());
    }

    #[test]
    fn parse_dry_run_short() {
        let cli = Cli::parse_from(["connectables", "-d", "run", "nas", "mount"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_config_root_override() {
        let cli = Cli::parse_from(["connectables", "--config-root", "/tmp/conf", "check"]);
        assert_eq!(cli.global.config_root, Some(PathBuf::from("/tmp/conf")));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::parse_from(["connectables", "list", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn command_names() {
        assert_eq!(Cli::parse_from(["connectables", "version"]).command.name(), "version");
        assert_eq!(Cli::parse_from(["connectables", "check"]).command.name(), "check");
    }
}
