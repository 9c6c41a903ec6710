//! Command-line interface definitions for cardmirror.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for cardmirror.
#[derive(Parser)]
#[command(
    name = "cardmirror",
    version = crate::VERSION,
    about = "Incrementally render a tree of source cards into a mirrored output tree",
    long_about = "Mirrors a source tree into a destination tree, converting only cards that are \
                  missing or older than their source, and reports destination entries that no \
                  longer have a source"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/cardmirror/config.toml)
    #[arg(long, global = true, value_name = "PATH", env = "CARDMIRROR_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

/// The source/destination pair shared by `build` and `status`.
#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// Source directory containing the editable cards
    #[arg(short, long, value_name = "DIR")]
    pub source: PathBuf,

    /// Destination directory for the rendered output
    #[arg(short, long, value_name = "DIR")]
    pub dest: PathBuf,

    /// Suffix of tracked source cards (e.g. ".kra")
    #[arg(long, value_name = "SUFFIX", allow_hyphen_values = true)]
    pub source_suffix: Option<String>,

    /// Suffix of rendered output cards (e.g. ".jpg")
    #[arg(long, value_name = "SUFFIX", allow_hyphen_values = true)]
    pub output_suffix: Option<String>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Convert every missing or stale card into the destination tree
    Build {
        #[command(flatten)]
        tree: TreeArgs,

        /// Build into an existing destination directory
        #[arg(short = 'w', long)]
        overwrite: bool,

        /// Only show what would be converted
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Converter command template with {input} and {output} placeholders
        #[arg(long, value_name = "COMMAND")]
        converter: Option<String>,
    },

    /// Show what a build would do, including unaccounted destination entries
    Status {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Write a configuration file with the default settings
    InitConfig {
        /// Replace an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
