//! # Path Catalog
//!
//! A [`Catalog`] records, relative to one root, every subdirectory and every
//! file carrying the tracked suffix. It is built by a single recursive scan
//! and is not modified afterwards.
//!
//! Catalog order is walker order. The walker sorts entries by file name, so
//! two scans of an unchanged tree produce identical catalogs, but nothing in
//! the reconciler relies on that order for correctness.
//!
//! ## Missing roots
//!
//! | Kind          | Root missing                  | Root is a file |
//! |---------------|-------------------------------|----------------|
//! | `Source`      | fatal                         | fatal          |
//! | `Destination` | empty catalog (first build)   | fatal          |
//!
//! Destination files without the tracked suffix, and destination cards that
//! are dangling symlinks, are kept aside in [`Catalog::unknown_files`] so the
//! caller can warn about them.

use crate::utils::{has_suffix, paths::relative_to};
use anyhow::{Context, Result, bail};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{Level, debug, span, trace};
use walkdir::WalkDir;

/// Which side of the mirror a catalog describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// Editable source tree; must exist.
    Source,
    /// Rendered output tree; may not exist yet.
    Destination,
}

impl CatalogKind {
    /// Lowercase label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
        }
    }
}

/// A tracked file and the modification time observed during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Root-relative path.
    pub path: PathBuf,
    /// Modification time at scan time.
    pub modified: SystemTime,
}

/// Directories and cards discovered beneath one root.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Absolute root the relative paths are anchored at.
    root: PathBuf,
    /// Tracked file suffix, e.g. `.kra`.
    suffix: String,
    /// Root-relative directories in traversal order, root excluded.
    directories: Vec<PathBuf>,
    /// Lookup set mirroring `directories`.
    directory_set: HashSet<PathBuf>,
    /// Tracked cards in traversal order.
    cards: Vec<Card>,
    /// Relative card path -> position in `cards`.
    card_index: HashMap<PathBuf, usize>,
    /// Destination files without the tracked suffix or without a target.
    unknown_files: Vec<PathBuf>,
}

impl Catalog {
    /// Creates an empty catalog for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            suffix: suffix.into(),
            directories: Vec::new(),
            directory_set: HashSet::new(),
            cards: Vec::new(),
            card_index: HashMap::new(),
            unknown_files: Vec::new(),
        }
    }

    /// Scans `root` recursively.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a source root does not exist or cannot be read
    /// - the root exists but is not a directory
    /// - any entry beneath the root cannot be read
    pub fn scan(root: &Path, kind: CatalogKind, suffix: &str) -> Result<Self> {
        let span = span!(Level::DEBUG, "scan", kind = kind.label(), root = %root.display());
        let _guard = span.enter();

        let mut catalog = Self::new(root, suffix);

        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => bail!(
                "The {} root {} is not a directory",
                kind.label(),
                root.display()
            ),
            Err(e) if e.kind() == ErrorKind::NotFound && kind == CatalogKind::Destination => {
                debug!("Destination root does not exist yet; nothing built");
                return Ok(catalog);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Cannot read {} root {}", kind.label(), root.display())
                });
            }
        }

        for entry in WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| {
                format!("Failed to traverse {} tree {}", kind.label(), root.display())
            })?;
            let relative = relative_to(entry.path(), root)?;

            if entry.file_type().is_dir() {
                trace!(path = %relative.display(), "Directory");
                catalog.push_directory(relative);
                continue;
            }

            if has_suffix(entry.file_name(), suffix) {
                // Follows symlinks so a linked card reports its target's mtime.
                let modified = match fs::metadata(entry.path()).and_then(|m| m.modified()) {
                    Ok(modified) => modified,
                    Err(e)
                        if e.kind() == ErrorKind::NotFound && kind == CatalogKind::Destination =>
                    {
                        debug!(path = %relative.display(), "Dangling destination link");
                        catalog.unknown_files.push(relative);
                        continue;
                    }
                    Err(e) => {
                        return Err(e).with_context(|| {
                            format!(
                                "Failed to read modification time of {}",
                                entry.path().display()
                            )
                        });
                    }
                };
                trace!(path = %relative.display(), "Card");
                catalog.push_card(relative, modified);
            } else if kind == CatalogKind::Destination {
                debug!(path = %relative.display(), "Unknown destination file");
                catalog.unknown_files.push(relative);
            }
        }

        debug!(
            directories = catalog.directories.len(),
            cards = catalog.cards.len(),
            unknown = catalog.unknown_files.len(),
            "Scan complete"
        );
        Ok(catalog)
    }

    /// Records a directory, ignoring duplicates.
    pub fn insert_directory(&mut self, path: impl Into<PathBuf>) {
        self.push_directory(path.into());
    }

    /// Records a card, registering any uncatalogued parent directories
    /// first so every card's containing directory is present.
    pub fn insert_card(&mut self, path: impl Into<PathBuf>, modified: SystemTime) {
        let path = path.into();
        let mut missing: Vec<PathBuf> = path
            .ancestors()
            .skip(1)
            .filter(|a| !a.as_os_str().is_empty())
            .take_while(|a| !self.directory_set.contains(*a))
            .map(Path::to_path_buf)
            .collect();
        missing.reverse();
        for dir in missing {
            self.push_directory(dir);
        }
        self.push_card(path, modified);
    }

    /// Appends a directory unless it is already known.
    fn push_directory(&mut self, path: PathBuf) {
        if self.directory_set.insert(path.clone()) {
            self.directories.push(path);
        }
    }

    /// Appends a card, replacing the mtime of an already known path.
    fn push_card(&mut self, path: PathBuf, modified: SystemTime) {
        if let Some(&idx) = self.card_index.get(&path) {
            self.cards[idx].modified = modified;
            return;
        }
        self.card_index.insert(path.clone(), self.cards.len());
        self.cards.push(Card { path, modified });
    }

    /// Absolute root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tracked suffix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Directories in traversal order.
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Cards in traversal order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Destination files that do not carry the tracked suffix.
    #[must_use]
    pub fn unknown_files(&self) -> &[PathBuf] {
        &self.unknown_files
    }

    /// Whether `path` is a catalogued directory.
    #[must_use]
    pub fn contains_directory(&self, path: &Path) -> bool {
        self.directory_set.contains(path)
    }

    /// Looks up a card by relative path.
    #[must_use]
    pub fn card(&self, path: &Path) -> Option<&Card> {
        self.card_index.get(path).map(|&idx| &self.cards[idx])
    }

    /// No directories, no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::TestTree;
    use std::time::{Duration, UNIX_EPOCH};

    fn sorted(paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut v = paths.to_vec();
        v.sort();
        v
    }

    #[test]
    fn test_scan_records_directories_and_cards() {
        let tree = TestTree::new().unwrap();
        tree.write_source("a.kra", "a").unwrap();
        tree.write_source("sub/b.kra", "b").unwrap();
        tree.write_source("sub/deeper/c.kra", "c").unwrap();
        tree.write_source("sub/notes.txt", "ignored").unwrap();

        let catalog = Catalog::scan(tree.source(), CatalogKind::Source, ".kra").unwrap();

        assert_eq!(
            sorted(catalog.directories()),
            vec![PathBuf::from("sub"), PathBuf::from("sub/deeper")]
        );
        let cards: Vec<_> = catalog.cards().iter().map(|c| c.path.clone()).collect();
        assert_eq!(
            sorted(&cards),
            vec![
                PathBuf::from("a.kra"),
                PathBuf::from("sub/b.kra"),
                PathBuf::from("sub/deeper/c.kra"),
            ]
        );
        // Non-matching source files are silently ignored.
        assert!(catalog.unknown_files().is_empty());
    }

    #[test]
    fn test_scan_excludes_root_itself() {
        let tree = TestTree::new().unwrap();
        tree.write_source("a.kra", "a").unwrap();

        let catalog = Catalog::scan(tree.source(), CatalogKind::Source, ".kra").unwrap();
        assert!(catalog.directories().is_empty());
        assert!(!catalog.contains_directory(Path::new("")));
    }

    #[test]
    fn test_scan_missing_source_is_fatal() {
        let tree = TestTree::new().unwrap();
        let missing = tree.path().join("nope");

        let err = Catalog::scan(&missing, CatalogKind::Source, ".kra").unwrap_err();
        assert!(format!("{err:#}").contains("source root"));
    }

    #[test]
    fn test_scan_missing_destination_is_empty() {
        let tree = TestTree::new().unwrap();

        let catalog = Catalog::scan(tree.dest(), CatalogKind::Destination, ".jpg").unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.unknown_files().is_empty());
        assert_eq!(catalog.root(), tree.dest());
    }

    #[test]
    fn test_scan_root_that_is_a_file_is_fatal() {
        let tree = TestTree::new().unwrap();
        let file = tree.path().join("plain");
        fs::write(&file, "x").unwrap();

        assert!(Catalog::scan(&file, CatalogKind::Destination, ".jpg").is_err());
        assert!(Catalog::scan(&file, CatalogKind::Source, ".kra").is_err());
    }

    #[test]
    fn test_scan_destination_reports_unknown_files() {
        let tree = TestTree::new().unwrap();
        tree.write_dest("a.jpg", "a").unwrap();
        tree.write_dest("sub/readme.md", "?").unwrap();

        let catalog = Catalog::scan(tree.dest(), CatalogKind::Destination, ".jpg").unwrap();
        assert_eq!(catalog.cards().len(), 1);
        assert_eq!(catalog.unknown_files(), &[PathBuf::from("sub/readme.md")]);
        assert!(catalog.contains_directory(Path::new("sub")));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_destination_link_is_diagnostic() {
        let tree = TestTree::new().unwrap();
        tree.write_dest("a.jpg", "a").unwrap();
        std::os::unix::fs::symlink(tree.dest().join("gone"), tree.dest().join("stale.jpg"))
            .unwrap();

        let catalog = Catalog::scan(tree.dest(), CatalogKind::Destination, ".jpg").unwrap();
        assert!(catalog.card(Path::new("a.jpg")).is_some());
        assert!(catalog.card(Path::new("stale.jpg")).is_none());
        assert_eq!(catalog.unknown_files(), &[PathBuf::from("stale.jpg")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_source_link_is_fatal() {
        let tree = TestTree::new().unwrap();
        std::os::unix::fs::symlink(tree.source().join("gone"), tree.source().join("b.kra"))
            .unwrap();

        assert!(Catalog::scan(tree.source(), CatalogKind::Source, ".kra").is_err());
    }

    #[test]
    fn test_scan_captures_modification_time() {
        let tree = TestTree::new().unwrap();
        let path = tree.write_source("a.kra", "a").unwrap();
        tree.set_mtime(&path, 1_000).unwrap();

        let catalog = Catalog::scan(tree.source(), CatalogKind::Source, ".kra").unwrap();
        let card = catalog.card(Path::new("a.kra")).unwrap();
        assert_eq!(card.modified, UNIX_EPOCH + Duration::from_secs(1_000));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let tree = TestTree::new().unwrap();
        for name in ["z.kra", "m/a.kra", "a.kra", "m/z/q.kra"] {
            tree.write_source(name, name).unwrap();
        }

        let first = Catalog::scan(tree.source(), CatalogKind::Source, ".kra").unwrap();
        let second = Catalog::scan(tree.source(), CatalogKind::Source, ".kra").unwrap();
        assert_eq!(first.directories(), second.directories());
        assert_eq!(first.cards(), second.cards());
    }

    #[test]
    fn test_insert_card_registers_parent_chain() {
        let mut catalog = Catalog::new("/src", ".kra");
        catalog.insert_card("a/b/c.kra", UNIX_EPOCH);
        catalog.insert_card("a/d.kra", UNIX_EPOCH);

        assert_eq!(
            catalog.directories(),
            &[PathBuf::from("a"), PathBuf::from("a/b")]
        );
        assert_eq!(catalog.cards().len(), 2);
    }

    #[test]
    fn test_insert_card_twice_keeps_one_entry() {
        let mut catalog = Catalog::new("/src", ".kra");
        catalog.insert_card("a.kra", UNIX_EPOCH);
        catalog.insert_card("a.kra", UNIX_EPOCH + Duration::from_secs(5));

        assert_eq!(catalog.cards().len(), 1);
        assert_eq!(
            catalog.card(Path::new("a.kra")).unwrap().modified,
            UNIX_EPOCH + Duration::from_secs(5)
        );
    }
}
