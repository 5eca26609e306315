//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Sync a Beads issue store into Cody build artifacts (JSONL -> markdown)
#[derive(Parser, Debug)]
#[command(name = "cody-sync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (auto-discover from .beads/ or .cody/ if not set)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Issue store path (default: <root>/.beads/issues.jsonl)
    #[arg(long, global = true)]
    pub issues: Option<PathBuf>,

    /// Build-output root (default: <root>/.cody/project/build)
    #[arg(long, global = true)]
    pub build_root: Option<PathBuf>,

    /// Version section ordering: lexical or semver
    #[arg(long, global = true)]
    pub version_order: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append JSON log lines to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regenerate the feature backlog and existing version tasklists
    Sync(SyncArgs),

    /// Print the feature backlog without writing it
    Backlog(RenderArgs),

    /// Print one version's tasklist without writing it
    Tasklist(TasklistArgs),

    /// List issues with their resolved version and phase
    List(ListArgs),

    /// Explain how issues are classified
    Classify(ClassifyArgs),

    /// Analyze dependencies of an issue, or list all cycles
    Deps(DepsArgs),

    /// Report malformed lines, dangling dependencies, and cycles
    Check(CheckArgs),

    /// Show the resolved configuration
    Config,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Render everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Include closed issues in version tasklists
    #[arg(long)]
    pub include_closed: bool,
}

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TasklistArgs {
    /// Version label (e.g. v0.5.0)
    pub version: String,

    /// Include closed issues
    #[arg(long)]
    pub include_closed: bool,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only issues that are not closed
    #[arg(long)]
    pub open: bool,

    /// Filter by issue type (can be repeated)
    #[arg(long = "type", short = 't')]
    pub type_: Vec<String>,

    /// Filter by resolved version (use the Backlog label for unversioned)
    #[arg(long = "version")]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Issue IDs
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct DepsArgs {
    /// Issue ID to analyze
    #[arg(required_unless_present = "cycles")]
    pub id: Option<String>,

    /// List every dependency cycle in the store
    #[arg(long, conflicts_with = "id")]
    pub cycles: bool,
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Exit non-zero if any problem is found
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}
