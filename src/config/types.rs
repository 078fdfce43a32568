use crate::exclusion::ExclusionSet;
use crate::roots::{Root, SyncRoots};
use crate::scan::DEFAULT_FINGERPRINT_WORKERS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn default_left_label() -> String {
    "left".to_string()
}

fn default_right_label() -> String {
    "right".to_string()
}

fn default_fingerprint_workers() -> usize {
    DEFAULT_FINGERPRINT_WORKERS
}

/// A named pair of directories to keep in sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProfile {
    pub left_dir: PathBuf,
    pub right_dir: PathBuf,
    #[serde(default = "default_left_label")]
    pub left_label: String,
    #[serde(default = "default_right_label")]
    pub right_label: String,
}

impl SyncProfile {
    pub fn new(left_dir: impl Into<PathBuf>, right_dir: impl Into<PathBuf>) -> Self {
        Self {
            left_dir: left_dir.into(),
            right_dir: right_dir.into(),
            left_label: default_left_label(),
            right_label: default_right_label(),
        }
    }

    pub fn with_labels(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_label = left.into();
        self.right_label = right.into();
        self
    }

    pub fn roots(&self) -> SyncRoots {
        SyncRoots::new(
            Root::new(&self.left_dir, &self.left_label),
            Root::new(&self.right_dir, &self.right_label),
        )
    }
}

/// Everything persisted in ~/.sharesync/config.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Schema version for future migrations
    pub schema_version: u32,

    /// When the config was last modified
    #[serde(default)]
    pub updated_at: String,

    #[serde(flatten)]
    pub exclusions: ExclusionSet,

    /// Maximum number of files hashed at the same time
    #[serde(default = "default_fingerprint_workers")]
    pub fingerprint_workers: usize,

    /// Follow-up log location; the working directory is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_file: Option<PathBuf>,

    #[serde(default)]
    pub profiles: BTreeMap<String, SyncProfile>,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self {
            schema_version: 1,
            updated_at: crate::utils::now_iso(),
            exclusions: ExclusionSet::default(),
            fingerprint_workers: default_fingerprint_workers(),
            follow_up_file: None,
            profiles: BTreeMap::new(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
