//! Identity matching between two scans.
//!
//! Paths present on both sides are compared by timestamp, size and, only
//! when needed, fingerprint. Paths present on one side only are paired up as
//! moves when exactly one same-content candidate exists on the other side.
//! Any other group of same-content only-side files is ambiguous.

mod types;

pub use types::{
    AmbiguousMove, Classification, ClassificationCounts, ClassificationKind, Classifications,
};

use crate::diff::are_identical;
use crate::roots::Side;
use crate::scan::{FileRecord, ScanWarning, TreeScan};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

type ContentKey = (u64, String);

/// Records whose fingerprint `classify` will need.
///
/// Lets the caller hash them in parallel before classification runs.
pub fn fingerprint_candidates(left: &TreeScan, right: &TreeScan) -> Vec<Arc<FileRecord>> {
    let mut candidates = Vec::new();

    for (path, left_record) in &left.records {
        if let Some(right_record) = right.get(path) {
            if needs_content_check(left_record, right_record) {
                candidates.push(Arc::clone(left_record));
                candidates.push(Arc::clone(right_record));
            }
        }
    }

    let only_left = only_in(left, right);
    let only_right = only_in(right, left);
    let left_sizes = sizes_to_hash(&only_left, &only_right);
    let right_sizes = sizes_to_hash(&only_right, &only_left);

    candidates.extend(
        only_left
            .into_iter()
            .filter(|record| left_sizes.contains(&record.size))
            .cloned(),
    );
    candidates.extend(
        only_right
            .into_iter()
            .filter(|record| right_sizes.contains(&record.size))
            .cloned(),
    );

    candidates
}

/// Classify every path of the two scans
pub fn classify(left: &TreeScan, right: &TreeScan) -> Classifications {
    let mut result = Classifications::default();

    for (path, left_record) in &left.records {
        if let Some(right_record) = right.get(path) {
            let classification = compare_present(path, left_record, right_record, &mut result.warnings);
            result.items.push(classification);
        }
    }

    let only_left = only_in(left, right);
    let only_right = only_in(right, left);

    // Moves are resolved first so that a rename is never reported as an
    // unrelated add and delete.
    let left_index = index_by_content(
        &only_left,
        &sizes_to_hash(&only_left, &only_right),
        &mut result.warnings,
    );
    let right_index = index_by_content(
        &only_right,
        &sizes_to_hash(&only_right, &only_left),
        &mut result.warnings,
    );

    let mut matched_left = HashSet::new();
    let mut matched_right = HashSet::new();
    let keys: BTreeSet<&ContentKey> = left_index.keys().chain(right_index.keys()).collect();

    for key in keys {
        let left_candidates = left_index.get(key).map(Vec::as_slice).unwrap_or_default();
        let right_candidates = right_index.get(key).map(Vec::as_slice).unwrap_or_default();

        match (left_candidates, right_candidates) {
            ([left_record], [right_record]) => {
                let moved_on = later_side(left_record.changed, right_record.changed);
                debug!(
                    left = %left_record.relative_path,
                    right = %right_record.relative_path,
                    "Detected move"
                );
                matched_left.insert(left_record.relative_path.clone());
                matched_right.insert(right_record.relative_path.clone());
                result.items.push(Classification::Moved {
                    left_path: left_record.relative_path.clone(),
                    right_path: right_record.relative_path.clone(),
                    moved_on,
                });
            }
            ([_], []) | ([], [_]) => {}
            _ => {
                let ambiguous = AmbiguousMove {
                    size: key.0,
                    fingerprint: key.1.clone(),
                    left_paths: left_candidates.iter().map(|r| r.relative_path.clone()).collect(),
                    right_paths: right_candidates.iter().map(|r| r.relative_path.clone()).collect(),
                };
                warn!(
                    left = ?ambiguous.left_paths,
                    right = ?ambiguous.right_paths,
                    "Ambiguous move, leaving candidates unresolved"
                );
                result.ambiguous.push(ambiguous);
            }
        }
    }

    for record in only_left {
        if !matched_left.contains(&record.relative_path) {
            result.items.push(Classification::OnlyLeft {
                path: record.relative_path.clone(),
            });
        }
    }
    for record in only_right {
        if !matched_right.contains(&record.relative_path) {
            result.items.push(Classification::OnlyRight {
                path: record.relative_path.clone(),
            });
        }
    }

    result.items.sort_by(|a, b| {
        a.kind()
            .cmp(&b.kind())
            .then_with(|| a.primary_path().cmp(b.primary_path()))
    });

    result
}

fn compare_present(
    path: &str,
    left: &FileRecord,
    right: &FileRecord,
    warnings: &mut Vec<ScanWarning>,
) -> Classification {
    if left.size == right.size && left.modified == right.modified {
        return Classification::Unchanged {
            path: path.to_string(),
        };
    }

    let newer = later_side(left.modified, right.modified);
    match are_identical(left, right) {
        Ok(true) => {
            debug!("Timestamps differ but content matches for {}", path);
            Classification::Unchanged {
                path: path.to_string(),
            }
        }
        Ok(false) => Classification::Modified {
            path: path.to_string(),
            newer,
        },
        Err(e) => {
            warn!("Cannot compare contents of {}: {}", path, e);
            warnings.push(ScanWarning::new(
                &left.absolute_path,
                format!("content unreadable: {}", e),
            ));
            Classification::Modified {
                path: path.to_string(),
                newer,
            }
        }
    }
}

fn needs_content_check(left: &FileRecord, right: &FileRecord) -> bool {
    left.size == right.size && left.modified != right.modified
}

fn later_side<T: Ord>(left: T, right: T) -> Option<Side> {
    match left.cmp(&right) {
        Ordering::Greater => Some(Side::Left),
        Ordering::Less => Some(Side::Right),
        Ordering::Equal => None,
    }
}

fn only_in<'a>(scan: &'a TreeScan, other: &TreeScan) -> Vec<&'a Arc<FileRecord>> {
    scan.records
        .iter()
        .filter(|(path, _)| !other.contains(path))
        .map(|(_, record)| record)
        .collect()
}

/// Sizes worth hashing on one side: those the other side also has, and
/// those shared by several files on this side
fn sizes_to_hash(own: &[&Arc<FileRecord>], other: &[&Arc<FileRecord>]) -> HashSet<u64> {
    let other_sizes: HashSet<u64> = other.iter().map(|record| record.size).collect();
    let mut seen = HashSet::new();
    let mut result = HashSet::new();

    for record in own {
        if other_sizes.contains(&record.size) || !seen.insert(record.size) {
            result.insert(record.size);
        }
    }
    result
}

/// Group records by `(size, fingerprint)`, hashing only the given sizes
fn index_by_content<'a>(
    records: &[&'a Arc<FileRecord>],
    hashed_sizes: &HashSet<u64>,
    warnings: &mut Vec<ScanWarning>,
) -> BTreeMap<ContentKey, Vec<&'a FileRecord>> {
    let mut index: BTreeMap<ContentKey, Vec<&FileRecord>> = BTreeMap::new();

    for &record in records {
        if !hashed_sizes.contains(&record.size) {
            continue;
        }
        if let Some(fingerprint) = fingerprint_or_warn(record, warnings) {
            index
                .entry((record.size, fingerprint.to_string()))
                .or_default()
                .push(&**record);
        }
    }

    index
}

fn fingerprint_or_warn<'a>(record: &'a FileRecord, warnings: &mut Vec<ScanWarning>) -> Option<&'a str> {
    match record.fingerprint() {
        Ok(fingerprint) => Some(fingerprint),
        Err(e) => {
            warn!("Cannot fingerprint {}: {}", record.absolute_path.display(), e);
            warnings.push(ScanWarning::new(
                &record.absolute_path,
                format!("content unreadable: {}", e),
            ));
            None
        }
    }
}
