//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Hierarchical edge bundling: tree, links and subdivided edge paths from dotted-name records
#[derive(Parser, Debug)]
#[command(name = "edgebundle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./.edgebundle.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Name segment separator
    #[arg(long, global = true)]
    pub delimiter: Option<String>,

    /// Hang all top-level records below a synthesized root with this name
    #[arg(long, global = true)]
    pub implicit_root: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the record hierarchy as tree
    Tree {
        /// JSON records file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show per-leaf link counts and dangling references
    Links {
        /// JSON records file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show leaf positions of the radial layout
    Layout {
        /// JSON records file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Route, subdivide and color all edges
    Edges {
        /// JSON records file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Split depth: each edge becomes 2^k fragments
        #[arg(short = 'k', long)]
        split_depth: Option<u32>,
        /// Bundling strength in [0, 1]
        #[arg(long)]
        beta: Option<f64>,
        /// Emit JSON (edges and strokes)
        #[arg(long)]
        json: bool,
        /// Write output to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
