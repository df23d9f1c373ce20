//! CLI argument parsing module for tierup

use crate::config::SourceKind;
use crate::output::Verbosity;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Dependency sync and tiered release orchestrator
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tierup",
    version,
    about = "Keep the livetemplate repositories in dependency sync and release them tier by tier"
)]
pub struct CliArgs {
    /// Configuration file (default: ./tierup.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory containing the repository checkouts
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Where latest releases are looked up (overrides the configuration)
    #[arg(long, global = true, value_enum)]
    pub source: Option<SourceKind>,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open pull requests for every out-of-date dependency pin
    Sync(SyncArgs),
    /// Release every tier in dependency order, syncing pins between tiers
    Release(ReleaseArgs),
    /// Print the release tiers derived from the dependency graph
    Tiers(TiersArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output the plan in JSON format
    #[arg(long)]
    pub json: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReleaseArgs {
    /// Forward --dry-run to release scripts and only preview dependency updates
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Answer yes to the start prompt and every tier gate
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TiersArgs {
    /// Output the tiers in JSON format
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// Whether the command needs git, go and gh
    pub fn needs_tools(&self) -> bool {
        !matches!(self.command, Command::Tiers(_))
    }
}
