use super::action::{apply_action, resolve, resolve_with, Action, ActionOutcome};
use super::followup::{FollowUpEntry, FollowUpLog, FollowUpReason};
use super::plan::ReconciliationPlan;
use super::prompt::{Prompt, PromptError};
use crate::classify::{Classification, ClassificationCounts};
use crate::diff::{diff, ContentDiff};
use crate::roots::Side;
use crate::utils::join_relative;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub counts: ClassificationCounts,
    pub applied: usize,
    pub declined: usize,
    pub failed: usize,
    pub follow_ups: Vec<FollowUpEntry>,
    /// The run stopped before every classification was handled
    pub interrupted: bool,
}

/// Walk the plan, asking the operator about every actionable item.
///
/// Items are handled strictly one after another. Declines and failures are
/// written to the follow-up log; a prompt failure stops the run.
pub async fn execute_reconciliation(
    plan: &ReconciliationPlan,
    prompt: &dyn Prompt,
    follow_up: &FollowUpLog,
) -> RunSummary {
    let mut run = Run {
        plan,
        prompt,
        follow_up,
        summary: RunSummary {
            counts: plan.counts(),
            ..RunSummary::default()
        },
    };

    for warning in plan.warnings() {
        let entry = FollowUpEntry::new(
            FollowUpReason::ScanWarning,
            format!("Entry was skipped during the scan ({}).", warning.reason),
        )
        .with_path("Skipped path", &warning.path);
        run.record(entry).await;
    }

    for ambiguous in &plan.classifications.ambiguous {
        let mut entry = FollowUpEntry::new(
            FollowUpReason::AmbiguousMove,
            format!(
                "{} files on {} and {} files on {} share the same content; \
                 decide manually which ones belong together.",
                ambiguous.left_paths.len(),
                plan.roots.left.label,
                ambiguous.right_paths.len(),
                plan.roots.right.label
            ),
        );
        for path in &ambiguous.left_paths {
            entry = entry.with_path(
                format!("{} path", plan.roots.left.label),
                join_relative(&plan.roots.left.path, path),
            );
        }
        for path in &ambiguous.right_paths {
            entry = entry.with_path(
                format!("{} path", plan.roots.right.label),
                join_relative(&plan.roots.right.path, path),
            );
        }
        run.record(entry).await;
    }

    for classification in plan.classifications.actionable() {
        if let Err(e) = run.handle(classification).await {
            warn!("Stopping reconciliation: {}", e);
            run.summary.interrupted = true;
            let entry = FollowUpEntry::new(
                FollowUpReason::Interrupted,
                format!(
                    "The run stopped at '{}' ({}). Re-run the sync to handle the remaining files.",
                    classification.primary_path(),
                    e
                ),
            );
            run.record(entry).await;
            break;
        }
    }

    run.summary
}

struct Run<'a> {
    plan: &'a ReconciliationPlan,
    prompt: &'a dyn Prompt,
    follow_up: &'a FollowUpLog,
    summary: RunSummary,
}

impl Run<'_> {
    async fn handle(&mut self, classification: &Classification) -> Result<(), PromptError> {
        let plan = self.plan;
        let roots = &plan.roots;

        match classification {
            Classification::Unchanged { .. } => Ok(()),
            Classification::OnlyLeft { path } | Classification::OnlyRight { path } => {
                let side = if matches!(classification, Classification::OnlyLeft { .. }) {
                    Side::Left
                } else {
                    Side::Right
                };
                info!(
                    "File {} found on {} only, missing on {}.",
                    path,
                    roots.label(side),
                    roots.label(side.other())
                );
                let action = resolve_with(classification, side);
                self.propose(action, FollowUpReason::Skipped).await
            }
            Classification::Moved {
                left_path,
                right_path,
                moved_on,
            } => {
                match moved_on {
                    Some(side) => info!(
                        "The file '{}' was moved on {} (content is the same on both sides).",
                        left_path,
                        roots.label(*side)
                    ),
                    None => info!(
                        "'{}' on {} and '{}' on {} have the same content.",
                        left_path, roots.left.label, right_path, roots.right.label
                    ),
                }
                let action = match resolve(classification) {
                    Some(action) => action,
                    None => {
                        let question = format!(
                            "Which side has the correct location for '{}' / '{}'?",
                            left_path, right_path
                        );
                        let side = self.prompt.choose_side(&question, roots).await?;
                        resolve_with(classification, side)
                    }
                };
                self.propose(action, FollowUpReason::SkippedMove).await
            }
            Classification::Modified { path, newer } => {
                match newer {
                    Some(side) => info!("The file '{}' was modified on {}.", path, roots.label(*side)),
                    None => info!(
                        "The file '{}' differs but both copies have the same modified time.",
                        path
                    ),
                }

                let stale = newer.map(Side::other).unwrap_or(Side::Right);
                let content = self.content_diff(path, stale).await;
                self.prompt.present_diff(path, &content).await;

                let action = match resolve(classification) {
                    Some(action) => action,
                    None => {
                        let question = format!("Which copy of '{}' should be kept?", path);
                        let side = self.prompt.choose_side(&question, roots).await?;
                        resolve_with(classification, side)
                    }
                };
                self.propose(action, FollowUpReason::LeftDivergent).await
            }
        }
    }

    /// Diff from the stale copy to the other one
    async fn content_diff(&self, path: &str, stale: Side) -> ContentDiff {
        let roots = &self.plan.roots;
        let old = join_relative(roots.path(stale), path);
        let new = join_relative(roots.path(stale.other()), path);

        match tokio::task::spawn_blocking(move || diff(&old, &new)).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Diff task for {} failed: {}", path, e);
                ContentDiff::Unavailable(e.to_string())
            }
        }
    }

    async fn propose(&mut self, action: Action, declined: FollowUpReason) -> Result<(), PromptError> {
        let plan = self.plan;
        let roots = &plan.roots;
        if action == Action::Skip {
            return Ok(());
        }

        if !self.prompt.confirm(&action.question(roots)).await? {
            self.summary.declined += 1;
            let mut entry = FollowUpEntry::new(declined, action.declined_message(roots));
            for (label, path) in action.involved_paths(roots) {
                entry = entry.with_path(label, path);
            }
            self.record(entry).await;
            return Ok(());
        }

        match apply_action(roots, &action).await {
            Ok(outcome) => {
                self.summary.applied += 1;
                match outcome {
                    ActionOutcome::Copied { from, to } | ActionOutcome::Overwritten { from, to } => {
                        info!("Copied {} to {}", from.display(), to.display())
                    }
                    ActionOutcome::Moved { from, to } => {
                        info!("Moved {} to {}", from.display(), to.display())
                    }
                    ActionOutcome::Skipped => {}
                }
            }
            Err(failure) => {
                error!("Action failed: {}", failure);
                self.summary.failed += 1;
                let mut entry = FollowUpEntry::new(
                    FollowUpReason::ActionFailed,
                    format!(
                        "Could not complete \"{}\" ({}): {}",
                        action.question(roots).trim_end_matches('?'),
                        failure.reason(),
                        failure
                    ),
                );
                for (label, path) in action.involved_paths(roots) {
                    entry = entry.with_path(label, path);
                }
                self.record(entry).await;
            }
        }
        Ok(())
    }

    async fn record(&mut self, entry: FollowUpEntry) {
        debug!(reason = %entry.reason, "Recording follow-up");
        if let Err(e) = self.follow_up.append(&entry).await {
            error!(
                "Failed to write follow-up log {}: {}",
                self.follow_up.path().display(),
                e
            );
        }
        self.summary.follow_ups.push(entry);
    }
}
