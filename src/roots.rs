use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One of the two trees being reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// A root directory and the name shown to the operator for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub path: PathBuf,
    pub label: String,
}

impl Root {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// The pair of roots for one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRoots {
    pub left: Root,
    pub right: Root,
}

impl SyncRoots {
    pub fn new(left: Root, right: Root) -> Self {
        Self { left, right }
    }

    /// Roots labelled plainly "left" and "right"
    pub fn unlabelled(left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        Self {
            left: Root::new(left, Side::Left.to_string()),
            right: Root::new(right, Side::Right.to_string()),
        }
    }

    pub fn get(&self, side: Side) -> &Root {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn path(&self, side: Side) -> &Path {
        &self.get(side).path
    }

    pub fn label(&self, side: Side) -> &str {
        &self.get(side).label
    }
}
