use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clipper-bookmarks")]
#[command(about = "Clipper bookmark synchronization tool", long_about = None)]
pub struct Cli {
    /// TOML config file; defaults to the user config dir when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq, Default)]
pub enum Command {
    /// Walk through toggles, listings and reconciliation (default mode)
    #[default]
    Demo,
    /// Print a listing with the bookmark overlay
    List {
        /// Only bookmarked clippers
        #[arg(short, long)]
        bookmarked: bool,
        /// Case-insensitive match on name or note
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Flip the bookmark for one clipper
    Toggle {
        /// Clipper id
        id: String,
    },
    /// Reconcile local bookmarks against a seeded remote list
    Reconcile {
        /// Comma-separated ids the remote table holds
        #[arg(short, long, value_delimiter = ',')]
        remote: Vec<String>,
    },
    /// Clear every local bookmark
    Reset,
}
