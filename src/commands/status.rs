use crate::MirrorContext;
use crate::commands::report_plan;
use crate::output::Reporter;
use crate::reconcile::Reconciliation;
use anyhow::Result;

/// Reconciles without converting and prints the plan and diagnostics.
///
/// Read-only: safe to run at any time, including against a destination
/// that does not exist yet.
///
/// # Errors
///
/// Returns an error if either tree cannot be scanned.
pub fn execute(ctx: &MirrorContext, reporter: &Reporter) -> Result<Reconciliation> {
    let plan = ctx.reconcile()?;

    if plan.is_up_to_date() && !plan.has_diagnostics() {
        reporter.success(&format!(
            "Destination is up to date ({} card{})",
            plan.up_to_date,
            if plan.up_to_date == 1 { "" } else { "s" }
        ));
        return Ok(plan);
    }

    report_plan(&plan, reporter, true);
    Ok(plan)
}
