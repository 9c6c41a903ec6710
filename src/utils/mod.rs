//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`paths`]: Root normalization and path manipulation

/// Path manipulation and resolution utilities
pub mod paths;

use std::ffi::OsStr;

/// Whether a file name ends with `suffix`, compared on the raw encoded bytes
/// so names that are not valid UTF-8 are still matched.
#[must_use]
pub fn has_suffix(name: &OsStr, suffix: &str) -> bool {
    !suffix.is_empty() && name.as_encoded_bytes().ends_with(suffix.as_bytes())
}

/// `name` without a trailing `suffix`, on the raw encoded bytes.
///
/// Returns `None` when `name` does not end with `suffix`.
#[must_use]
pub fn strip_suffix<'a>(name: &'a OsStr, suffix: &str) -> Option<&'a OsStr> {
    if !has_suffix(name, suffix) {
        return None;
    }
    let bytes = name.as_encoded_bytes();
    let stem = &bytes[..bytes.len() - suffix.len()];
    // SAFETY: `stem` comes from `name` and is split immediately before a
    // non-empty valid UTF-8 string, which is a permitted split point.
    Some(unsafe { OsStr::from_encoded_bytes_unchecked(stem) })
}

/// Integer percentage of `done` over `total`, `100` for an empty total.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}
