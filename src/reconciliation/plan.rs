use crate::classify::{classify, fingerprint_candidates, ClassificationCounts, Classifications};
use crate::exclusion::ExclusionSet;
use crate::roots::SyncRoots;
use crate::scan::{
    prefetch_fingerprints, scan_roots, ScanError, ScanWarning, TreeScan,
    DEFAULT_FINGERPRINT_WORKERS,
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Precondition failed: {0}")]
    PreconditionFailure(#[from] ScanError),

    #[error("Classification task failed: {0}")]
    TaskFailed(String),
}

/// Tuning knobs for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Maximum number of files hashed at the same time
    pub fingerprint_workers: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            fingerprint_workers: DEFAULT_FINGERPRINT_WORKERS,
        }
    }
}

/// Read-only snapshot of how the two roots differ
#[derive(Debug, Clone)]
pub struct ReconciliationPlan {
    pub roots: SyncRoots,
    pub left: TreeScan,
    pub right: TreeScan,
    pub classifications: Classifications,
}

impl ReconciliationPlan {
    pub fn counts(&self) -> ClassificationCounts {
        self.classifications.counts()
    }

    /// Check if operator decisions are needed
    pub fn needs_decisions(&self) -> bool {
        self.counts().actionable() > 0
    }

    /// Nothing to ask, nothing ambiguous and nothing skipped
    pub fn is_in_sync(&self) -> bool {
        !self.needs_decisions()
            && self.classifications.ambiguous.is_empty()
            && self.warnings().next().is_none()
    }

    /// Every entry skipped while scanning or classifying
    pub fn warnings(&self) -> impl Iterator<Item = &ScanWarning> {
        self.left
            .warnings
            .iter()
            .chain(self.right.warnings.iter())
            .chain(self.classifications.warnings.iter())
    }
}

/// Scan both roots and classify every file.
///
/// Nothing on disk is modified. Fails only when a root is missing.
pub async fn build_reconciliation_plan(
    roots: &SyncRoots,
    exclusions: &ExclusionSet,
    options: &ReconcileOptions,
) -> Result<ReconciliationPlan, PlanError> {
    info!(
        left = %roots.left.path.display(),
        right = %roots.right.path.display(),
        "Comparing {} and {}",
        roots.left.label,
        roots.right.label
    );
    debug!(
        excluded_files = ?exclusions.excluded_files,
        excluded_dirs = ?exclusions.excluded_dirs,
        "Exclusions"
    );

    let (left, right) = scan_roots(roots, exclusions).await?;

    let candidates = fingerprint_candidates(&left, &right);
    if !candidates.is_empty() {
        let hashed = prefetch_fingerprints(candidates, options.fingerprint_workers).await;
        debug!("Fingerprinted {} files", hashed);
    }

    // classify still hashes whatever the prefetch could not
    let (left, right, classifications) = tokio::task::spawn_blocking(move || {
        let classifications = classify(&left, &right);
        (left, right, classifications)
    })
    .await
    .map_err(|e| PlanError::TaskFailed(e.to_string()))?;

    Ok(ReconciliationPlan {
        roots: roots.clone(),
        left,
        right,
        classifications,
    })
}
