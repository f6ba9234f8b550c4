use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI arguments
#[derive(Parser)]
#[command(
    name = "decomment",
    version,
    about = "Find and remove comments from source files"
)]
pub struct Cli {
    /// Log filter (see tracing-subscriber's EnvFilter syntax)
    #[arg(long, env = "DECOMMENT_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List comments without touching any file
    Scan(ScanArgs),
    /// Remove the comments a scan finds
    Fix(FixArgs),
}

/// Arguments for the scan command
#[derive(Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print every comment, not just per-file counts
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit the comment list as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the fix command
#[derive(Args)]
pub struct FixArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Options shared by scan and fix that choose which files and lines to
/// look at.
#[derive(Args)]
pub struct SelectionArgs {
    /// Specific files to scan, relative to the repository root
    pub paths: Vec<PathBuf>,

    /// Scan whole files instead of only lines added since the baseline
    #[arg(long)]
    pub all: bool,

    /// Base revision for a commit-range scan
    #[arg(long)]
    pub base: Option<String>,

    /// Target revision for a commit-range scan
    #[arg(long)]
    pub target: Option<String>,

    /// Include untracked files
    #[arg(short = 'u', long)]
    pub include_untracked: bool,

    /// Scan files that ignore rules would normally exclude
    #[arg(long)]
    pub include_ignored: bool,
}
