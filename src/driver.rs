//! # Conversion Driver
//!
//! Executes a [`Reconciliation`]:
//!
//! 1. Creates every directory in `directories_to_create` (idempotent). Any
//!    failure aborts the run before a single card is converted.
//! 2. Converts `cards_to_convert` strictly in order, one at a time, printing
//!    `(index, total, percent)` before each conversion.
//! 3. Stops at the first converter failure. Outputs written before the
//!    failure stay on disk; nothing is rolled back or retried.
//!
//! There is no timeout: a hanging converter hangs the run.

use crate::MirrorContext;
use crate::convert::Converter;
use crate::output::Reporter;
use crate::reconcile::{Reconciliation, WorkItem};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{Level, debug, info, span};

/// What a driver run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Directories created (or found already present) under the destination.
    pub directories_created: usize,
    /// Cards converted successfully.
    pub converted: usize,
    /// Cards that were queued.
    pub total: usize,
    /// Wall-clock time spent in the driver.
    pub elapsed: Duration,
}

/// Creates the destination root and every directory in `directories`.
///
/// # Errors
///
/// Returns an error naming the first directory that could not be created.
pub fn create_directories(
    dest_root: &Path,
    directories: &[PathBuf],
    reporter: &Reporter,
) -> Result<usize> {
    fs::create_dir_all(dest_root).with_context(|| {
        format!(
            "Failed to create destination root: {}",
            dest_root.display()
        )
    })?;

    for dir in directories {
        let path = dest_root.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        debug!(dir = %dir.display(), "Directory created");
        reporter.action("Created", &format!("{}/", dir.display()));
    }
    Ok(directories.len())
}

/// Converts one work item, resolving its relative paths against the roots.
fn convert_item<C: Converter + ?Sized>(
    ctx: &MirrorContext,
    item: &WorkItem,
    converter: &C,
) -> Result<()> {
    let source = ctx.source_root.join(&item.source);
    let destination = ctx.dest_root.join(&item.destination);

    let span = span!(Level::INFO, "card", source = %item.source.display());
    let _guard = span.enter();

    converter.convert(&source, &destination)?;
    info!(destination = %item.destination.display(), "Converted");
    Ok(())
}

/// Runs the plan. See the module docs for ordering and failure policy.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or if the converter
/// fails; the error names the failing card.
pub fn run<C: Converter + ?Sized>(
    ctx: &MirrorContext,
    plan: &Reconciliation,
    converter: &C,
    reporter: &Reporter,
) -> Result<ConversionReport> {
    let started = Instant::now();
    let total = plan.cards_to_convert.len();

    let directories_created =
        create_directories(&ctx.dest_root, &plan.directories_to_create, reporter)?;

    let mut progress = reporter.start_progress("Converting", total);
    let mut converted = 0;

    for item in &plan.cards_to_convert {
        let event = progress.advance(&item.source.display().to_string());
        debug!(
            index = event.index,
            total = event.total,
            percent = event.percent,
            card = %item.source.display(),
            "Converting"
        );

        convert_item(ctx, item, converter).with_context(|| {
            format!(
                "Failed to convert {} -> {} (card {}/{})",
                item.source.display(),
                item.destination.display(),
                event.index,
                event.total
            )
        })?;
        converted += 1;
    }

    progress.finish();

    Ok(ConversionReport {
        directories_created,
        converted,
        total,
        elapsed: started.elapsed(),
    })
}
