//! Tree scanning.
//!
//! A scan walks one root, prunes excluded directories, and records size and
//! timestamps for every regular file. Content fingerprints stay lazy; the
//! matcher asks only for the ones it needs.

mod record;

pub use record::FileRecord;

use crate::exclusion::ExclusionSet;
use crate::roots::SyncRoots;
use crate::utils::to_posix_relative;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default number of files hashed concurrently
pub const DEFAULT_FINGERPRINT_WORKERS: usize = 4;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Root directory '{0}' does not exist")]
    RootNotFound(PathBuf),

    #[error("Root '{0}' is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("Scan task failed: {0}")]
    TaskFailed(String),
}

/// An entry the scanner skipped instead of recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl ScanWarning {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Point-in-time snapshot of one root
#[derive(Debug, Clone)]
pub struct TreeScan {
    pub root: PathBuf,
    /// Records keyed by `/`-separated relative path
    pub records: BTreeMap<String, Arc<FileRecord>>,
    pub warnings: Vec<ScanWarning>,
}

impl TreeScan {
    pub fn get(&self, relative_path: &str) -> Option<&Arc<FileRecord>> {
        self.records.get(relative_path)
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.records.contains_key(relative_path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fail unless `root` exists and is a directory
pub fn check_root(root: &Path) -> Result<(), ScanError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::RootNotDirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Walk `root` and record every in-scope regular file.
///
/// Excluded directories are pruned, so nothing below them is visited.
/// Symlinks, special files and unreadable entries become warnings.
pub fn scan_tree(root: &Path, exclusions: &ExclusionSet) -> Result<TreeScan, ScanError> {
    check_root(root)?;

    let mut scan = TreeScan {
        root: root.to_path_buf(),
        records: BTreeMap::new(),
        warnings: Vec::new(),
    };

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let pruned = entry.depth() > 0
                && entry.file_type().is_dir()
                && exclusions.is_excluded_dir(&entry.file_name().to_string_lossy());
            if pruned {
                debug!("Excluding directory {}", entry.path().display());
            }
            !pruned
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                warn!("Skipping unreadable entry {}: {}", path.display(), e);
                scan.warnings.push(ScanWarning::new(path, format!("unreadable: {}", e)));
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        let path = entry.path();
        if file_type.is_symlink() {
            warn!("Skipping symbolic link {}", path.display());
            scan.warnings.push(ScanWarning::new(path, "symbolic link skipped"));
            continue;
        }
        if !file_type.is_file() {
            warn!("Skipping non-regular file {}", path.display());
            scan.warnings.push(ScanWarning::new(path, "not a regular file"));
            continue;
        }

        let Some(relative_path) = to_posix_relative(root, path) else {
            warn!("Skipping file with a non-UTF-8 path {}", path.display());
            scan.warnings.push(ScanWarning::new(path, "file name is not valid UTF-8"));
            continue;
        };

        if exclusions.is_excluded(&relative_path) {
            debug!("Excluding file {}", relative_path);
            continue;
        }

        let record = entry
            .metadata()
            .map_err(std::io::Error::from)
            .and_then(|metadata| {
                FileRecord::from_metadata(relative_path.clone(), path.to_path_buf(), &metadata)
            });

        match record {
            Ok(record) => {
                if scan.records.contains_key(&relative_path) {
                    warn!("Duplicate relative path {}", relative_path);
                    scan.warnings.push(ScanWarning::new(path, "relative path is not unique"));
                    continue;
                }
                scan.records.insert(relative_path, Arc::new(record));
            }
            Err(e) => {
                warn!("Cannot read metadata of {}: {}", path.display(), e);
                scan.warnings.push(ScanWarning::new(path, format!("metadata unavailable: {}", e)));
            }
        }
    }

    debug!(
        root = %root.display(),
        files = scan.records.len(),
        warnings = scan.warnings.len(),
        "Scan complete"
    );

    Ok(scan)
}

/// Scan both roots in parallel on the blocking pool.
///
/// Both roots are checked before either walk starts.
pub async fn scan_roots(
    roots: &SyncRoots,
    exclusions: &ExclusionSet,
) -> Result<(TreeScan, TreeScan), ScanError> {
    check_root(&roots.left.path)?;
    check_root(&roots.right.path)?;

    let (left, right) = tokio::join!(
        spawn_scan(roots.left.path.clone(), exclusions.clone()),
        spawn_scan(roots.right.path.clone(), exclusions.clone()),
    );

    Ok((left?, right?))
}

async fn spawn_scan(root: PathBuf, exclusions: ExclusionSet) -> Result<TreeScan, ScanError> {
    tokio::task::spawn_blocking(move || scan_tree(&root, &exclusions))
        .await
        .map_err(|e| ScanError::TaskFailed(e.to_string()))?
}

/// Hash records concurrently, at most `workers` files at a time.
///
/// Failures are left for the caller to rediscover when it asks for the
/// fingerprint; this only warms the per-record cache. Returns the number of
/// fingerprints computed.
pub async fn prefetch_fingerprints(records: Vec<Arc<FileRecord>>, workers: usize) -> usize {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for record in records {
        if record.cached_fingerprint().is_some() {
            continue;
        }
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            let path = record.absolute_path.clone();
            match tokio::task::spawn_blocking(move || record.fingerprint().map(|_| ())).await {
                Ok(Ok(())) => Some(()),
                Ok(Err(e)) => {
                    debug!("Cannot fingerprint {}: {}", path.display(), e);
                    None
                }
                Err(e) => {
                    warn!("Fingerprint task for {} failed: {}", path.display(), e);
                    None
                }
            }
        });
    }

    let mut computed = 0;
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Some(())) = joined {
            computed += 1;
        }
    }
    computed
}
