use crate::classify::Classification;
use crate::roots::{Side, SyncRoots};
use crate::utils::join_relative;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// A proposed mutation, always derived from one classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CopyLeftToRight { path: String },
    CopyRightToLeft { path: String },
    /// Rename `from` to `to` inside one root
    MoveWithinRoot { root: Side, from: String, to: String },
    /// Replace `path` on `target` with the copy from the other side
    Overwrite { target: Side, path: String },
    Skip,
}

/// What an applied action did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Copied { from: PathBuf, to: PathBuf },
    Moved { from: PathBuf, to: PathBuf },
    Overwritten { from: PathBuf, to: PathBuf },
    Skipped,
}

/// Why an action could not be completed
#[derive(Error, Debug)]
pub enum ActionFailure {
    #[error("Source vanished: {0}")]
    SourceVanished(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Target is read-only: {0}")]
    ReadOnlyTarget(PathBuf),

    #[error("Target already exists: {0}")]
    TargetExists(PathBuf),

    #[error("IO error on {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ActionFailure {
    /// Short reason recorded in the follow-up log
    pub fn reason(&self) -> &'static str {
        match self {
            ActionFailure::SourceVanished(_) => "source vanished",
            ActionFailure::PermissionDenied(_) => "permission denied",
            ActionFailure::ReadOnlyTarget(_) => "read-only target",
            ActionFailure::TargetExists(_) => "target exists",
            ActionFailure::IoError { .. } => "io error",
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => ActionFailure::PermissionDenied(path.to_path_buf()),
            _ => ActionFailure::IoError {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Propose an action, or `None` when the operator must pick the
/// authoritative side first
pub fn resolve(classification: &Classification) -> Option<Action> {
    match classification {
        Classification::Modified { newer, .. } => newer.map(|side| resolve_with(classification, side)),
        Classification::Moved { moved_on, .. } => {
            moved_on.map(|side| resolve_with(classification, side))
        }
        _ => Some(resolve_with(classification, Side::Left)),
    }
}

/// Propose an action treating `authoritative` as the side to keep.
///
/// Only modified and moved classifications depend on the side.
pub fn resolve_with(classification: &Classification, authoritative: Side) -> Action {
    match classification {
        Classification::OnlyLeft { path } => Action::CopyLeftToRight { path: path.clone() },
        Classification::OnlyRight { path } => Action::CopyRightToLeft { path: path.clone() },
        Classification::Unchanged { .. } => Action::Skip,
        Classification::Modified { path, .. } => Action::Overwrite {
            target: authoritative.other(),
            path: path.clone(),
        },
        Classification::Moved {
            left_path,
            right_path,
            ..
        } => {
            let (from, to) = match authoritative {
                Side::Left => (right_path, left_path),
                Side::Right => (left_path, right_path),
            };
            Action::MoveWithinRoot {
                root: authoritative.other(),
                from: from.clone(),
                to: to.clone(),
            }
        }
    }
}

impl Action {
    /// Confirmation question shown to the operator
    pub fn question(&self, roots: &SyncRoots) -> String {
        match self {
            Action::CopyLeftToRight { path } => format!(
                "Copy {} from {} to {}?",
                path,
                roots.label(Side::Left),
                roots.label(Side::Right)
            ),
            Action::CopyRightToLeft { path } => format!(
                "Copy {} from {} to {}?",
                path,
                roots.label(Side::Right),
                roots.label(Side::Left)
            ),
            Action::MoveWithinRoot { root, from, to } => format!(
                "Move '/{}' to '/{}' on {} to match {}?",
                from,
                to,
                roots.label(*root),
                roots.label(root.other())
            ),
            Action::Overwrite { target, path } => format!(
                "Copy '{}' from {} to {}, overwriting it?",
                path,
                roots.label(target.other()),
                roots.label(*target)
            ),
            Action::Skip => "Nothing to do.".to_string(),
        }
    }

    /// Follow-up message for when the operator says no
    pub fn declined_message(&self, roots: &SyncRoots) -> String {
        match self {
            Action::CopyLeftToRight { path } => format!(
                "You chose NOT to copy '{}' from {} to {}.",
                path,
                roots.label(Side::Left),
                roots.label(Side::Right)
            ),
            Action::CopyRightToLeft { path } => format!(
                "You chose NOT to copy '{}' from {} to {}.",
                path,
                roots.label(Side::Right),
                roots.label(Side::Left)
            ),
            Action::MoveWithinRoot { root, from, to } => format!(
                "You chose NOT to move '/{}' to '/{}' on {} to match {}.",
                from,
                to,
                roots.label(*root),
                roots.label(root.other())
            ),
            Action::Overwrite { target, path } => format!(
                "You chose NOT to copy '{}' from {} to {}. The two copies still differ.",
                path,
                roots.label(target.other()),
                roots.label(*target)
            ),
            Action::Skip => String::new(),
        }
    }

    /// Labelled absolute paths involved in the action
    pub fn involved_paths(&self, roots: &SyncRoots) -> Vec<(String, PathBuf)> {
        let at = |side: Side, path: &str| {
            (
                format!("{} path", roots.label(side)),
                join_relative(roots.path(side), path),
            )
        };
        match self {
            Action::CopyLeftToRight { path }
            | Action::CopyRightToLeft { path }
            | Action::Overwrite { path, .. } => vec![at(Side::Left, path), at(Side::Right, path)],
            Action::MoveWithinRoot { root, from, to } => vec![
                ("Outdated path".to_string(), join_relative(roots.path(*root), from)),
                ("Destination path".to_string(), join_relative(roots.path(*root), to)),
            ],
            Action::Skip => Vec::new(),
        }
    }
}

/// Execute one confirmed action against the filesystem.
///
/// The source is re-checked right before mutating, since the scan is a
/// snapshot.
pub async fn apply_action(roots: &SyncRoots, action: &Action) -> Result<ActionOutcome, ActionFailure> {
    match action {
        Action::Skip => Ok(ActionOutcome::Skipped),
        Action::CopyLeftToRight { path } => {
            let (from, to) = copy_between(roots, Side::Left, path);
            ensure_absent(&to).await?;
            copy_file(&from, &to).await?;
            Ok(ActionOutcome::Copied { from, to })
        }
        Action::CopyRightToLeft { path } => {
            let (from, to) = copy_between(roots, Side::Right, path);
            ensure_absent(&to).await?;
            copy_file(&from, &to).await?;
            Ok(ActionOutcome::Copied { from, to })
        }
        Action::Overwrite { target, path } => {
            let (from, to) = copy_between(roots, target.other(), path);
            ensure_writable(&to).await?;
            copy_file(&from, &to).await?;
            Ok(ActionOutcome::Overwritten { from, to })
        }
        Action::MoveWithinRoot { root, from, to } => {
            let root_path = roots.path(*root);
            let from = join_relative(root_path, from);
            let to = join_relative(root_path, to);
            ensure_source(&from).await?;
            ensure_absent(&to).await?;
            create_parent(&to).await?;
            fs::rename(&from, &to)
                .await
                .map_err(|e| ActionFailure::from_io(&from, e))?;
            Ok(ActionOutcome::Moved { from, to })
        }
    }
}

fn copy_between(roots: &SyncRoots, source: Side, path: &str) -> (PathBuf, PathBuf) {
    (
        join_relative(roots.path(source), path),
        join_relative(roots.path(source.other()), path),
    )
}

async fn ensure_source(path: &Path) -> Result<std::fs::Metadata, ActionFailure> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(metadata),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ActionFailure::SourceVanished(path.to_path_buf()))
        }
        Err(e) => Err(ActionFailure::from_io(path, e)),
    }
}

async fn ensure_absent(path: &Path) -> Result<(), ActionFailure> {
    match fs::symlink_metadata(path).await {
        Ok(_) => Err(ActionFailure::TargetExists(path.to_path_buf())),
        Err(_) => Ok(()),
    }
}

async fn ensure_writable(path: &Path) -> Result<(), ActionFailure> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.permissions().readonly() => {
            Err(ActionFailure::ReadOnlyTarget(path.to_path_buf()))
        }
        _ => Ok(()),
    }
}

async fn create_parent(path: &Path) -> Result<(), ActionFailure> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ActionFailure::from_io(parent, e))?;
    }
    Ok(())
}

/// Copy contents and carry over the modification time
async fn copy_file(from: &Path, to: &Path) -> Result<(), ActionFailure> {
    let metadata = ensure_source(from).await?;
    create_parent(to).await?;
    fs::copy(from, to)
        .await
        .map_err(|e| ActionFailure::from_io(to, e))?;

    if let Ok(modified) = metadata.modified() {
        preserve_modified_time(to, modified).await;
    }
    Ok(())
}

async fn preserve_modified_time(path: &Path, modified: SystemTime) {
    let target = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || -> io::Result<()> {
        std::fs::File::options()
            .write(true)
            .open(&target)?
            .set_modified(modified)
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!("Cannot preserve modified time of {}: {}", path.display(), e),
        Err(e) => debug!("Timestamp task for {} failed: {}", path.display(), e),
    }
}
