use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::config::OutputFormat;

#[derive(Parser)]
#[command(name = "tg", about = concat!("taskgraph v", env!("CARGO_PKG_VERSION"), " - task dependency graphs from markdown checklists"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different vault directory
    #[arg(short = 'C', long = "vault-dir", global = true)]
    pub vault_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default taskgraph.toml in the current directory
    Init(InitArgs),
    /// Render the dependency graph
    Graph(GraphArgs),
    /// List tasks
    List(ListArgs),
    /// Show a task with its dependencies and dependents
    Show(ShowArgs),
    /// Show dependency tree for a task
    Deps(DepsArgs),
    /// Toggle a task between open and done
    Toggle(ToggleArgs),
    /// Make one task depend on another
    Dep(DepArgs),
    /// Validate ids and dependencies
    Check,
    /// Re-render the graph whenever a document changes
    Watch(WatchArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing taskgraph.toml
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct GraphArgs {
    /// Output format: dot or json (default: from config)
    #[arg(long)]
    pub format: Option<OutputFormat>,
    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only completed tasks
    #[arg(long, conflicts_with = "open")]
    pub done: bool,
    /// Only open tasks
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID to show
    pub id: String,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Task ID to show dependency tree for
    pub id: String,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Output format: dot or json (default: from config)
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ToggleArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct DepArgs {
    /// Dependency task ID (must be done first)
    pub from: String,
    /// Task ID that gains the dependency
    pub to: String,
}
