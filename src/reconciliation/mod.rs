//! Reconciliation of two roots.
//!
//! A run is split in two phases: [`build_reconciliation_plan`] scans and
//! classifies without touching anything, [`execute_reconciliation`] walks the
//! plan with the operator and applies what they confirm.

mod action;
mod execute;
mod followup;
mod plan;
mod prompt;

pub use action::{apply_action, resolve, resolve_with, Action, ActionFailure, ActionOutcome};
pub use execute::{execute_reconciliation, RunSummary};
pub use followup::{FollowUpEntry, FollowUpLog, FollowUpReason};
pub use plan::{build_reconciliation_plan, PlanError, ReconcileOptions, ReconciliationPlan};
pub use prompt::{ConsolePrompt, Prompt, PromptError, ScriptedPrompt};

use crate::exclusion::ExclusionSet;
use crate::roots::SyncRoots;
use tracing::info;

/// Run a complete reconciliation pass
pub async fn reconcile(
    roots: &SyncRoots,
    exclusions: &ExclusionSet,
    options: &ReconcileOptions,
    prompt: &dyn Prompt,
    follow_up: &FollowUpLog,
) -> Result<RunSummary, PlanError> {
    let plan = build_reconciliation_plan(roots, exclusions, options).await?;

    let counts = plan.counts();
    info!(
        only_left = counts.only_left,
        only_right = counts.only_right,
        moved = counts.moved,
        modified = counts.modified,
        unchanged = counts.unchanged,
        ambiguous = counts.ambiguous,
        "Classification complete"
    );

    if plan.is_in_sync() {
        info!("{} and {} are already in sync.", roots.left.label, roots.right.label);
    }

    Ok(execute_reconciliation(&plan, prompt, follow_up).await)
}
