pub mod classify;
pub mod config;
pub mod diff;
pub mod exclusion;
pub mod reconciliation;
pub mod roots;
pub mod scan;
pub mod utils;

// Re-export commonly used types
pub use classify::{
    classify, AmbiguousMove, Classification, ClassificationCounts, ClassificationKind,
    Classifications,
};
pub use config::{ConfigError, ConfigStore, SyncConfig, SyncProfile};
pub use diff::{are_identical, ContentDiff};
pub use exclusion::ExclusionSet;
pub use reconciliation::{
    build_reconciliation_plan, execute_reconciliation, reconcile, Action, ActionFailure,
    ConsolePrompt, FollowUpEntry, FollowUpLog, FollowUpReason, PlanError, Prompt,
    ReconcileOptions, ReconciliationPlan, RunSummary, ScriptedPrompt,
};
pub use roots::{Root, Side, SyncRoots};
pub use scan::{scan_tree, FileRecord, ScanError, ScanWarning, TreeScan};
