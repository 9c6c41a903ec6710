use crate::config::Config;
use crate::output::Reporter;
use anyhow::{Result, bail};
use std::path::Path;

/// Writes the default configuration to `path`.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if the
/// file cannot be written.
pub fn execute(path: &Path, force: bool, reporter: &Reporter) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file {} already exists (use --force to replace it)",
            path.display()
        );
    }

    Config::default().save(path)?;
    reporter.success(&format!("Wrote default configuration to {}", path.display()));
    Ok(())
}
