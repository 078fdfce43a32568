//! Durable follow-up log for everything not resolved interactively.
//!
//! Entries are appended as markdown sections and never rewritten.

use crate::utils::now_local;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Why an item was left for manual review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FollowUpReason {
    /// Operator declined a copy
    Skipped,
    /// Operator declined replaying a move
    SkippedMove,
    /// Operator declined an overwrite, so the two copies still differ
    LeftDivergent,
    ActionFailed,
    AmbiguousMove,
    ScanWarning,
    /// The run stopped before this point
    Interrupted,
}

impl fmt::Display for FollowUpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FollowUpReason::Skipped => "skipped",
            FollowUpReason::SkippedMove => "skipped-move",
            FollowUpReason::LeftDivergent => "left-divergent",
            FollowUpReason::ActionFailed => "action-failed",
            FollowUpReason::AmbiguousMove => "ambiguous-move",
            FollowUpReason::ScanWarning => "scan-warning",
            FollowUpReason::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// One deferred or declined item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpEntry {
    pub reason: FollowUpReason,
    pub message: String,
    /// Labelled paths the operator should look at
    pub paths: Vec<(String, PathBuf)>,
    pub timestamp: String,
}

impl FollowUpEntry {
    pub fn new(reason: FollowUpReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            paths: Vec::new(),
            timestamp: now_local(),
        }
    }

    pub fn with_path(mut self, label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.paths.push((label.into(), path.into()));
        self
    }

    /// Markdown section appended to the log
    pub fn render(&self) -> String {
        let mut out = format!("### {} [{}]\n", self.timestamp, self.reason);
        out.push_str(self.message.trim());
        out.push('\n');
        if !self.paths.is_empty() {
            out.push_str("Please manually check:\n");
            for (label, path) in &self.paths {
                out.push_str(&format!(" - {}: {}\n", label, path.display()));
            }
        }
        out.push('\n');
        out
    }
}

/// Append-only markdown file of follow-up entries
#[derive(Debug, Clone)]
pub struct FollowUpLog {
    path: PathBuf,
}

impl FollowUpLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &FollowUpEntry) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.render().as_bytes()).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_includes_reason_and_paths() {
        let mut entry = FollowUpEntry::new(
            FollowUpReason::Skipped,
            "You chose NOT to copy 'a.txt' from KIS to client.",
        )
        .with_path("KIS path", "/kis/a.txt")
        .with_path("client path", "/client/a.txt");
        entry.timestamp = "2024-05-01 10:00:00".to_string();

        assert_eq!(
            entry.render(),
            "### 2024-05-01 10:00:00 [skipped]\n\
             You chose NOT to copy 'a.txt' from KIS to client.\n\
             Please manually check:\n \
             - KIS path: /kis/a.txt\n \
             - client path: /client/a.txt\n\n"
        );
    }

    #[tokio::test]
    async fn test_append_never_rewrites() {
        let temp = TempDir::new().unwrap();
        let log = FollowUpLog::new(temp.path().join("follow_up_tasks.md"));

        log.append(&FollowUpEntry::new(FollowUpReason::Skipped, "first"))
            .await
            .unwrap();
        log.append(&FollowUpEntry::new(FollowUpReason::LeftDivergent, "second"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let first = content.find("first").unwrap();
        let second = content.find("second").unwrap();
        assert!(first < second);
        assert!(content.contains("[skipped]"));
        assert!(content.contains("[left-divergent]"));
    }
}
