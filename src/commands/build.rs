use crate::MirrorContext;
use crate::commands::report_plan;
use crate::convert::Converter;
use crate::driver::{self, ConversionReport};
use crate::output::Reporter;
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Runs the full pipeline: scan, reconcile, create directories, convert.
///
/// With `dry_run`, stops after printing the plan; nothing is created.
///
/// # Errors
///
/// Returns an error if:
/// - the destination exists and overwriting is disabled
/// - the source root cannot be scanned
/// - the converter is unavailable or fails on any card
/// - a destination directory cannot be created
pub fn execute<C: Converter + ?Sized>(
    ctx: &MirrorContext,
    converter: &C,
    reporter: &Reporter,
    dry_run: bool,
) -> Result<ConversionReport> {
    reporter.verbose(&format!("Source structure: {}", ctx.source_root.display()));
    reporter.verbose(&format!("Output structure: {}", ctx.dest_root.display()));

    check_destination_root(&ctx.dest_root, ctx.config.core.overwrite)?;

    let plan = ctx.reconcile()?;
    report_plan(&plan, reporter, dry_run);

    if dry_run {
        reporter.info("Dry run; nothing converted");
        return Ok(ConversionReport {
            total: plan.cards_to_convert.len(),
            ..ConversionReport::default()
        });
    }

    if !plan.cards_to_convert.is_empty() {
        converter.ensure_ready()?;
    }

    let report = driver::run(ctx, &plan, converter, reporter)?;

    if report.converted == 0 {
        reporter.success("Everything up to date");
    } else {
        reporter.success(&format!(
            "Converted {} card{} in {}",
            report.converted,
            if report.converted == 1 { "" } else { "s" },
            humantime::format_duration(round_to_millis(report.elapsed))
        ));
    }

    Ok(report)
}

/// Enforces the overwrite policy on the destination root.
///
/// A missing root is fine (it is created later). An existing directory is
/// only accepted with `overwrite`. Nothing is created here.
///
/// # Errors
///
/// Returns an error if the root is not a directory, already exists while
/// `overwrite` is off, or cannot be inspected.
pub fn check_destination_root(dest_root: &Path, overwrite: bool) -> Result<()> {
    match fs::metadata(dest_root) {
        Ok(meta) if !meta.is_dir() => bail!(
            "Destination {} exists and is not a directory",
            dest_root.display()
        ),
        Ok(_) if !overwrite => bail!(
            "Destination {} already exists; pass --overwrite (or set core.overwrite = true) to update it",
            dest_root.display()
        ),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
            .with_context(|| format!("Cannot inspect destination {}", dest_root.display())),
    }
}

/// Drops sub-millisecond noise from the summary duration.
fn round_to_millis(d: std::time::Duration) -> std::time::Duration {
    std::time::Duration::from_millis(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
