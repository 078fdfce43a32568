use crate::roots::Side;
use crate::scan::ScanWarning;
use serde::Serialize;
use std::fmt;

/// Verdict for one logical file across the two roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    OnlyLeft {
        path: String,
    },
    OnlyRight {
        path: String,
    },
    Unchanged {
        path: String,
    },
    /// Present on both sides with different content. `newer` is the side
    /// with the later modification time, `None` on a tie.
    Modified {
        path: String,
        newer: Option<Side>,
    },
    /// Same content at different relative paths. `moved_on` is the side
    /// where the move most likely happened, `None` when undecidable.
    Moved {
        left_path: String,
        right_path: String,
        moved_on: Option<Side>,
    },
}

impl Classification {
    pub fn kind(&self) -> ClassificationKind {
        match self {
            Classification::OnlyLeft { .. } => ClassificationKind::OnlyLeft,
            Classification::OnlyRight { .. } => ClassificationKind::OnlyRight,
            Classification::Unchanged { .. } => ClassificationKind::Unchanged,
            Classification::Modified { .. } => ClassificationKind::Modified,
            Classification::Moved { .. } => ClassificationKind::Moved,
        }
    }

    /// The relative path used for ordering and display
    pub fn primary_path(&self) -> &str {
        match self {
            Classification::OnlyLeft { path }
            | Classification::OnlyRight { path }
            | Classification::Unchanged { path }
            | Classification::Modified { path, .. } => path,
            Classification::Moved { left_path, .. } => left_path,
        }
    }
}

/// Classification kinds, in the order they are presented to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ClassificationKind {
    OnlyLeft,
    OnlyRight,
    Moved,
    Modified,
    Unchanged,
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassificationKind::OnlyLeft => "only-left",
            ClassificationKind::OnlyRight => "only-right",
            ClassificationKind::Moved => "moved",
            ClassificationKind::Modified => "modified",
            ClassificationKind::Unchanged => "unchanged",
        };
        f.write_str(name)
    }
}

/// Several same-content candidates that cannot be paired automatically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousMove {
    pub size: u64,
    pub fingerprint: String,
    pub left_paths: Vec<String>,
    pub right_paths: Vec<String>,
}

/// Number of classifications of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCounts {
    pub only_left: usize,
    pub only_right: usize,
    pub unchanged: usize,
    pub modified: usize,
    pub moved: usize,
    pub ambiguous: usize,
}

impl ClassificationCounts {
    pub fn record(&mut self, kind: ClassificationKind) {
        match kind {
            ClassificationKind::OnlyLeft => self.only_left += 1,
            ClassificationKind::OnlyRight => self.only_right += 1,
            ClassificationKind::Unchanged => self.unchanged += 1,
            ClassificationKind::Modified => self.modified += 1,
            ClassificationKind::Moved => self.moved += 1,
        }
    }

    /// Classifications that will be surfaced to the operator
    pub fn actionable(&self) -> usize {
        self.only_left + self.only_right + self.modified + self.moved
    }
}

/// Output of the identity matcher
#[derive(Debug, Clone, Default)]
pub struct Classifications {
    /// Ordered by kind, then by relative path
    pub items: Vec<Classification>,
    pub ambiguous: Vec<AmbiguousMove>,
    /// Files whose content could not be read while classifying
    pub warnings: Vec<ScanWarning>,
}

impl Classifications {
    pub fn counts(&self) -> ClassificationCounts {
        let mut counts = ClassificationCounts::default();
        for item in &self.items {
            counts.record(item.kind());
        }
        counts.ambiguous = self.ambiguous.len();
        counts
    }

    /// Classifications that need an operator decision
    pub fn actionable(&self) -> impl Iterator<Item = &Classification> {
        self.items
            .iter()
            .filter(|c| c.kind() != ClassificationKind::Unchanged)
    }
}
