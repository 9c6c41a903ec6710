//! Output formatting, styling, and progress display for the cardmirror CLI.
//!
//! All user-facing lines go through a [`Reporter`], which the caller creates
//! once from the command-line flags and hands down by reference:
//! - Dimmed colors for routine messages
//! - Bold colors for warnings and errors
//! - Per-card progress lines during conversion
//! - Verbosity control (quiet, normal, verbose)
//!
//! Machine-oriented diagnostics go through `tracing` instead.

mod progress;

use colored::Colorize;

pub use progress::{Progress, ProgressEvent};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    #[default]
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

impl Verbosity {
    /// Picks a level from the `--quiet` / `--verbose` flags; quiet wins.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Writes user-facing messages to stderr at a fixed verbosity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    /// Threshold for informational output.
    verbosity: Verbosity,
}

impl Reporter {
    /// Creates a reporter at the given verbosity.
    #[must_use]
    pub const fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// The configured verbosity.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether informational messages are shown.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Prints a success message in green (respects quiet mode).
    pub fn success(&self, message: &str) {
        if self.is_quiet() {
            return;
        }
        eprintln!("{}", message.green());
    }

    /// Prints an error message in bold red (always shown).
    pub fn error(&self, message: &str) {
        eprintln!("{}", message.red().bold());
    }

    /// Prints a warning message in bold yellow (always shown).
    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }

    /// Prints an informational message in dimmed color (respects quiet mode).
    pub fn info(&self, message: &str) {
        if self.is_quiet() {
            return;
        }
        eprintln!("{}", message.dimmed());
    }

    /// Prints a verbose debug message (only in verbose mode).
    pub fn verbose(&self, message: &str) {
        if self.verbosity != Verbosity::Verbose {
            return;
        }
        eprintln!("{}", message.dimmed());
    }

    /// Prints a git-style action message with dimmed verb and normal message.
    pub fn action(&self, verb: &str, message: &str) {
        if self.is_quiet() {
            return;
        }
        eprintln!("{} {}", verb.dimmed().bold(), message);
    }

    /// Starts a progress counter over `total` items.
    #[must_use]
    pub fn start_progress(&self, title: &str, total: usize) -> Progress {
        Progress::new(title, total, !self.is_quiet())
    }
}
