//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// modgraph - resolve module manifests into a build plan
#[derive(Parser)]
#[command(name = "modgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the manifests and check that they resolve
    Check(CheckArgs),

    /// Emit the build plan as JSON
    Plan(PlanArgs),

    /// Print the build order
    Order(OrderArgs),

    /// Display the dependency tree of a module
    Tree(TreeArgs),

    /// Show the resolved include paths of a module
    Includes(IncludesArgs),
}

/// Where to find manifests and how to resolve them.
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Directory searched for `*.module.toml` files (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Fail on include paths that resolve to two different directories
    #[arg(long, env = "MODGRAPH_STRICT")]
    pub strict: bool,

    /// Module provided outside the manifest tree (repeatable)
    #[arg(long = "external", value_name = "NAME")]
    pub externals: Vec<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the plan to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct OrderArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Module to show the tree for
    pub module: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Include dynamic dependencies
    #[arg(long)]
    pub dynamic: bool,
}

#[derive(Args)]
pub struct IncludesArgs {
    /// Module to show include paths for
    pub module: String,

    #[command(flatten)]
    pub source: SourceArgs,
}
