use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "provision",
    about = "Idempotent workstation provisioning",
    version
)]
pub struct Cli {
    /// Defaults to `install` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Use this plan file instead of the built-in plan
    #[arg(long, global = true, value_name = "PATH")]
    pub plan: Option<PathBuf>,

    /// Evaluate preconditions without running any actions
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every step whose work is not already done
    Install(InstallOpts),
    /// List phases and steps
    List,
    /// Report which steps would run, without running anything
    Check(FilterOpts),
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print version information
    Version,
}

/// Step selection by case-insensitive substring of the step name.
#[derive(Parser, Debug, Clone, Default)]
pub struct FilterOpts {
    /// Skip matching steps
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only matching steps
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    #[command(flatten)]
    pub filter: FilterOpts,

    /// Print the run report as JSON after the summary
    #[arg(long)]
    pub json: bool,
}
