//! Command-line interface definition.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point.
///
/// Without a subcommand the interactive setup sequence runs.
#[derive(Parser, Debug)]
#[command(
    name = "macsetup",
    about = "Interactive macOS developer workstation setup",
    version
)]
pub struct Cli {
    /// Subcommand; `None` runs setup.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Task selection for setup.
    #[command(flatten)]
    pub setup: SetupOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Accept the default answer for every question
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Settings file (default: $XDG_CONFIG_HOME/macsetup/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<std::path::PathBuf>,
}

/// Options for the setup sequence.
#[derive(Parser, Debug, Clone, Default)]
pub struct SetupOpts {
    /// Skip specific tasks
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific tasks
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print version information
    Version,
}
