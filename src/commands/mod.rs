//! Command implementations for the cardmirror CLI.

/// `cardmirror build`
pub mod build;
/// `cardmirror init-config`
pub mod init_config;
/// `cardmirror status`
pub mod status;

use crate::output::Reporter;
use crate::reconcile::Reconciliation;

/// Prints the work list, the summary line and every diagnostic.
///
/// With `preview`, directories that a build would create are listed as
/// well; a real build prints those as it creates them.
pub fn report_plan(plan: &Reconciliation, reporter: &Reporter, preview: bool) {
    if preview {
        for dir in &plan.directories_to_create {
            reporter.action("Missing", &format!("{}/", dir.display()));
        }
    }

    for item in &plan.cards_to_convert {
        reporter.action(
            "Queued",
            &format!(
                "{} -> {} ({})",
                item.source.display(),
                item.destination.display(),
                item.reason
            ),
        );
    }

    reporter.info(&plan.summary());
    report_diagnostics(plan, reporter);
}

/// Warns about destination entries without a source and about colliding
/// source cards. Never fails.
pub fn report_diagnostics(plan: &Reconciliation, reporter: &Reporter) {
    for dir in &plan.unaccounted_directories {
        reporter.warning(&format!("unaccounted directory: {}/", dir.display()));
    }
    for card in &plan.unaccounted_cards {
        reporter.warning(&format!("unaccounted card: {}", card.display()));
    }
    for file in &plan.unknown_files {
        reporter.warning(&format!("unknown file: {}", file.display()));
    }
    for collision in &plan.collisions {
        reporter.warning(&format!(
            "{} and {} both render to {}; keeping {}",
            collision.kept.display(),
            collision.skipped.display(),
            collision.destination.display(),
            collision.kept.display()
        ));
    }
}
