//! # Reconciler
//!
//! Diffs a source [`Catalog`] against a destination [`Catalog`] and derives:
//!
//! - the destination directories to create (source order)
//! - the cards to convert, either missing or stale (source order)
//! - destination directories and cards with no source counterpart
//!
//! Reconciliation is a pure function of the two catalogs. It never touches
//! the filesystem, so it can be re-run freely for `status` and `--dry-run`.
//!
//! ## Staleness
//!
//! A card is stale only when the source mtime is *strictly* greater than the
//! destination mtime. Equal timestamps count as current.
//!
//! ## Collisions
//!
//! When two source cards derive the same destination path, the first one in
//! catalog order owns it. Later ones are recorded in
//! [`Reconciliation::collisions`] and never converted.

use crate::catalog::Catalog;
use crate::utils::strip_suffix;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Maps a source card path to its output path by swapping suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixRule {
    /// Suffix stripped from source cards.
    source: String,
    /// Suffix appended in its place.
    output: String,
}

impl SuffixRule {
    /// Creates a rule mapping `source` suffix to `output` suffix.
    #[must_use]
    pub fn new(source: &str, output: &str) -> Self {
        Self {
            source: source.to_string(),
            output: output.to_string(),
        }
    }

    /// Derives the output path for `path`: same directory, source suffix
    /// replaced with the output suffix. A path without the source suffix
    /// simply gets the output suffix appended.
    #[must_use]
    pub fn derive(&self, path: &Path) -> PathBuf {
        let Some(name) = path.file_name() else {
            return path.to_path_buf();
        };

        let mut new_name = strip_suffix(name, &self.source).unwrap_or(name).to_os_string();
        new_name.push(&self.output);
        path.with_file_name(new_name)
    }
}

/// Why a card was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// No output exists yet.
    Missing,
    /// The source is newer than the output.
    Stale,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "new"),
            Self::Stale => write!(f, "stale"),
        }
    }
}

/// One pending conversion. Both paths are root-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Source card, relative to the source root.
    pub source: PathBuf,
    /// Output card, relative to the destination root.
    pub destination: PathBuf,
    /// Why the card is queued.
    pub reason: Reason,
}

/// Two source cards that derive the same output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// The shared destination path.
    pub destination: PathBuf,
    /// The source card that owns the destination.
    pub kept: PathBuf,
    /// The source card that was skipped.
    pub skipped: PathBuf,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Destination-relative directories absent from the destination.
    pub directories_to_create: Vec<PathBuf>,
    /// Destination directories with no source directory.
    pub unaccounted_directories: Vec<PathBuf>,
    /// Missing or stale cards, in source order.
    pub cards_to_convert: Vec<WorkItem>,
    /// Destination cards with no source card.
    pub unaccounted_cards: Vec<PathBuf>,
    /// Destination files without the output suffix.
    pub unknown_files: Vec<PathBuf>,
    /// Source cards skipped because an earlier card owns their output.
    pub collisions: Vec<Collision>,
    /// Cards whose output is current.
    pub up_to_date: usize,
}

impl Reconciliation {
    /// Nothing to create, nothing to convert.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.directories_to_create.is_empty() && self.cards_to_convert.is_empty()
    }

    /// Any unaccounted, unknown or colliding entries.
    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.unaccounted_directories.is_empty()
            || !self.unaccounted_cards.is_empty()
            || !self.unknown_files.is_empty()
            || !self.collisions.is_empty()
    }

    /// Number of queued cards with the given reason.
    #[must_use]
    pub fn count(&self, reason: Reason) -> usize {
        self.cards_to_convert
            .iter()
            .filter(|item| item.reason == reason)
            .count()
    }

    /// One-line totals for the summary message.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} to convert ({} new, {} stale), {} up to date, {} director{} to create",
            self.cards_to_convert.len(),
            self.count(Reason::Missing),
            self.count(Reason::Stale),
            self.up_to_date,
            self.directories_to_create.len(),
            if self.directories_to_create.len() == 1 {
                "y"
            } else {
                "ies"
            },
        )
    }
}

/// Reconciles `source` against `destination`.
///
/// `derive_output_path` maps a source card's relative path to the relative
/// path its output should have.
pub fn reconcile<F>(
    source: &Catalog,
    destination: &Catalog,
    derive_output_path: F,
) -> Reconciliation
where
    F: Fn(&Path) -> PathBuf,
{
    let span = span!(Level::DEBUG, "reconcile_catalogs");
    let _guard = span.enter();

    let mut result = Reconciliation::default();

    // Directories
    let mut accounted_dirs: HashSet<&Path> = HashSet::new();
    for dir in source.directories() {
        if destination.contains_directory(dir) {
            accounted_dirs.insert(dir);
        } else {
            debug!(dir = %dir.display(), "Directory missing from destination");
            result.directories_to_create.push(dir.clone());
        }
    }
    result.unaccounted_directories = destination
        .directories()
        .iter()
        .filter(|dir| !accounted_dirs.contains(dir.as_path()))
        .cloned()
        .collect();

    // Cards; `owners` maps each claimed destination to the source that owns it.
    let mut owners: HashMap<PathBuf, &Path> = HashMap::new();
    for card in source.cards() {
        let output = derive_output_path(&card.path);

        if let Some(kept) = owners.get(&output) {
            debug!(
                kept = %kept.display(),
                skipped = %card.path.display(),
                "Output path already claimed"
            );
            result.collisions.push(Collision {
                destination: output,
                kept: kept.to_path_buf(),
                skipped: card.path.clone(),
            });
            continue;
        }

        let reason = match destination.card(&output) {
            None => Some(Reason::Missing),
            Some(existing) if card.modified > existing.modified => Some(Reason::Stale),
            Some(_) => None,
        };

        match reason {
            Some(reason) => {
                debug!(card = %card.path.display(), %reason, "Queued");
                result.cards_to_convert.push(WorkItem {
                    source: card.path.clone(),
                    destination: output.clone(),
                    reason,
                });
            }
            None => {
                debug!(card = %card.path.display(), "Current");
                result.up_to_date += 1;
            }
        }
        owners.insert(output, &card.path);
    }

    result.unaccounted_cards = destination
        .cards()
        .iter()
        .filter(|card| !owners.contains_key(&card.path))
        .map(|card| card.path.clone())
        .collect();
    result.unknown_files = destination.unknown_files().to_vec();

    debug!(
        convert = result.cards_to_convert.len(),
        create_dirs = result.directories_to_create.len(),
        unaccounted = result.unaccounted_cards.len(),
        "Reconciled"
    );
    result
}
