//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Last-seen visibility tracker.
///
/// Records the moment a surface goes hidden and reports, on the next
/// appearance, when the user was last seen.
#[derive(Debug, Parser)]
#[command(name = "seen", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the recorded last-seen timestamp.
    Last {
        /// Emit the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Record a single visibility transition.
    Mark {
        /// The new visibility state. Anything but "hidden" counts as visible.
        state: String,
    },

    /// Drive transitions from stdin, one state per line, until EOF.
    Watch,
}
