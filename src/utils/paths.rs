use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Normalizes a tree root for use in a [`crate::MirrorContext`].
///
/// Expands `~`, resolves relative paths against the current directory and
/// rebuilds the path from its components, which drops trailing separators
/// and `.` segments. `..` segments are kept as-is; the root is not
/// canonicalized because it may not exist yet.
///
/// # Errors
///
/// Returns an error if the home or current directory cannot be determined
pub fn normalize_root(path: &Path) -> Result<PathBuf> {
    let absolute = make_absolute(&expand_tilde(path)?)?;
    Ok(absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// Returns `path` relative to `root`
///
/// # Errors
///
/// Returns an error if `path` does not live under `root`
pub fn relative_to(path: &Path, root: &Path) -> Result<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .with_context(|| {
            format!(
                "Path {} is not under root {}",
                path.display(),
                root.display()
            )
        })
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    if let Some(path_str) = path.to_str() {
        if path_str.starts_with("~/") || path_str == "~" {
            let home = dirs::home_dir().context("Could not find home directory")?;
            if path_str == "~" {
                Ok(home)
            } else {
                Ok(home.join(&path_str[2..]))
            }
        } else {
            Ok(path.to_path_buf())
        }
    } else {
        Ok(path.to_path_buf())
    }
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(path))
    }
}
