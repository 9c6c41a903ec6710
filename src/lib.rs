#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)] // Counters and percentages over bounded work lists
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Cardmirror - Incremental Card Mirroring
//!
//! Cardmirror keeps a tree of rendered output files in step with a tree of
//! editable source documents ("cards"). Only cards that are missing from the
//! destination, or whose source is newer than the rendered output, are handed
//! to the external converter. Destination entries that no longer correspond to
//! any source are reported, never deleted.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐
//! │ Source tree  │──scan──┐
//! └──────────────┘        │    ┌────────────┐    ┌────────┐    ┌───────────┐
//!                         ├──> │ Reconciler │──> │ Driver │──> │ Converter │
//! ┌──────────────┐        │    └────────────┘    └────────┘    └───────────┘
//! │ Dest tree    │──scan──┘
//! └──────────────┘
//! ```
//!
//! - [`catalog`]: records every directory and tracked card beneath a root
//! - [`reconcile`]: diffs two catalogs into a work list plus diagnostics
//! - [`driver`]: creates missing directories and runs the converter per card
//! - [`convert`]: the converter collaborator (external command by default)
//! - [`config`]: TOML configuration (suffixes, converter command)
//! - [`output`]: user-facing reporting and progress lines
//! - [`commands`]: `build`, `status` and `init-config`
//!
//! ## Example Usage
//!
//! ```no_run
//! use cardmirror::{MirrorContext, config::Config, convert::CommandConverter, output::Reporter};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let converter = CommandConverter::from_template(&config.converter.command)?;
//! let ctx = MirrorContext::new(Path::new("cards"), Path::new("rendered"), config)?;
//! let reporter = Reporter::default();
//!
//! cardmirror::commands::build::execute(&ctx, &converter, &reporter, false)?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command bodies for the CLI (build, status, init-config).
pub mod commands;

/// Directory and card catalogs of a single root.
pub mod catalog;

/// Configuration parsing, validation, and management.
pub mod config;

/// Converter collaborator and its error type.
pub mod convert;

/// Conversion driver executing a reconciliation.
pub mod driver;

/// Output formatting and progress display.
pub mod output;

/// Source/destination catalog reconciliation.
pub mod reconcile;

/// Utility functions and helpers.
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

use anyhow::Result;
use catalog::{Catalog, CatalogKind};
use reconcile::{Reconciliation, SuffixRule};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Current version of the cardmirror binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file path relative to the platform config directory.
pub const DEFAULT_CONFIG_PATH: &str = "cardmirror/config.toml";

/// Environment variable consulted for the tracing filter.
pub const LOG_ENV: &str = "CARDMIRROR_LOG";

/// Explicit configuration for one mirroring run.
///
/// Every component receives the context by reference; nothing reads the
/// command line or the configuration file ambiently.
///
/// # Examples
///
/// ```no_run
/// use cardmirror::{MirrorContext, config::Config};
/// use std::path::Path;
///
/// # fn main() -> anyhow::Result<()> {
/// let ctx = MirrorContext::new(Path::new("~/kritanet/"), Path::new("/srv/jpg"), Config::default())?;
/// assert!(ctx.source_root.is_absolute());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MirrorContext {
    /// Absolute source root, trailing separators removed.
    pub source_root: PathBuf,

    /// Absolute destination root, trailing separators removed.
    pub dest_root: PathBuf,

    /// Loaded configuration settings (after CLI overrides).
    pub config: config::Config,
}

impl MirrorContext {
    /// Creates a context, normalising both roots.
    ///
    /// # Errors
    ///
    /// Returns an error if a relative root cannot be resolved against the
    /// current directory or `~` cannot be expanded.
    pub fn new(source_root: &Path, dest_root: &Path, config: config::Config) -> Result<Self> {
        Ok(Self {
            source_root: utils::paths::normalize_root(source_root)?,
            dest_root: utils::paths::normalize_root(dest_root)?,
            config,
        })
    }

    /// The suffix mapping from source cards to output cards.
    #[must_use]
    pub fn suffix_rule(&self) -> SuffixRule {
        SuffixRule::new(&self.config.core.source_suffix, &self.config.core.output_suffix)
    }

    /// Scans the source root.
    ///
    /// # Errors
    ///
    /// Returns an error if the source root is missing, unreadable or not a
    /// directory.
    pub fn source_catalog(&self) -> Result<Catalog> {
        Catalog::scan(
            &self.source_root,
            CatalogKind::Source,
            &self.config.core.source_suffix,
        )
    }

    /// Scans the destination root. A missing root yields an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination exists but cannot be traversed.
    pub fn destination_catalog(&self) -> Result<Catalog> {
        Catalog::scan(
            &self.dest_root,
            CatalogKind::Destination,
            &self.config.core.output_suffix,
        )
    }

    /// Scans both roots and reconciles them.
    ///
    /// Both catalogs are taken before anything is converted, so the result
    /// is a single consistent snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if either scan fails.
    pub fn reconcile(&self) -> Result<Reconciliation> {
        let span = span!(Level::DEBUG, "reconcile");
        let _guard = span.enter();

        let source = self.source_catalog()?;
        let destination = self.destination_catalog()?;
        debug!(
            source_cards = source.cards().len(),
            destination_cards = destination.cards().len(),
            "Catalogs scanned"
        );

        let rule = self.suffix_rule();
        Ok(reconcile::reconcile(&source, &destination, |path| {
            rule.derive(path)
        }))
    }
}
