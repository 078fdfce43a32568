mod common;

use common::{create_test_dir, write_file};
use sharesync::scan::{scan_roots, scan_tree, ScanError};
use sharesync::{ExclusionSet, SyncRoots};

#[test]
fn test_scan_records_nested_files_with_posix_paths() {
    let temp_dir = create_test_dir();
    let root = temp_dir.path();
    write_file(root, "a.txt", "a");
    write_file(root, "reports/2024/q1.txt", "quarter");

    let scan = scan_tree(root, &ExclusionSet::new()).expect("Should scan");

    assert_eq!(scan.len(), 2);
    let record = scan.get("reports/2024/q1.txt").expect("Should record nested file");
    assert_eq!(record.size, 7);
    assert_eq!(record.absolute_path, root.join("reports/2024/q1.txt"));
    assert!(record.cached_fingerprint().is_none());
}

#[test]
fn test_excluded_dir_contributes_nothing() {
    let temp_dir = create_test_dir();
    let root = temp_dir.path();
    write_file(root, "keep.txt", "keep");
    write_file(root, "excluded_dir/a.txt", "a");
    write_file(root, "deep/excluded_dir/b/c.txt", "c");
    write_file(root, "deep/Thumbs.db", "thumbs");

    let exclusions = ExclusionSet::from_names(["Thumbs.db"], ["excluded_dir"]);
    let scan = scan_tree(root, &exclusions).expect("Should scan");

    let paths: Vec<_> = scan.records.keys().cloned().collect();
    assert_eq!(paths, vec!["keep.txt".to_string()]);
    assert!(scan.warnings.is_empty());
}

#[test]
fn test_empty_directories_are_not_recorded() {
    let temp_dir = create_test_dir();
    std::fs::create_dir_all(temp_dir.path().join("empty/also_empty")).unwrap();

    let scan = scan_tree(temp_dir.path(), &ExclusionSet::new()).expect("Should scan");
    assert!(scan.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlink_becomes_warning() {
    let temp_dir = create_test_dir();
    let root = temp_dir.path();
    write_file(root, "target.txt", "t");
    std::os::unix::fs::symlink(root.join("target.txt"), root.join("link.txt")).unwrap();

    let scan = scan_tree(root, &ExclusionSet::new()).expect("Should scan");

    assert!(scan.contains("target.txt"));
    assert!(!scan.contains("link.txt"));
    assert_eq!(scan.warnings.len(), 1);
    assert_eq!(scan.warnings[0].path, root.join("link.txt"));
}

#[tokio::test]
async fn test_missing_root_fails_before_scanning() {
    let temp_dir = create_test_dir();
    let left = temp_dir.path().join("left");
    std::fs::create_dir_all(&left).unwrap();
    let roots = SyncRoots::unlabelled(&left, temp_dir.path().join("missing"));

    let result = scan_roots(&roots, &ExclusionSet::new()).await;
    assert!(matches!(result, Err(ScanError::RootNotFound(_))));
}

#[tokio::test]
async fn test_scan_roots_scans_both_sides() {
    let temp_dir = create_test_dir();
    let roots = common::create_roots(&temp_dir);
    write_file(&roots.left.path, "l.txt", "left");
    write_file(&roots.right.path, "r1.txt", "right");
    write_file(&roots.right.path, "r2.txt", "right");

    let (left, right) = scan_roots(&roots, &ExclusionSet::new())
        .await
        .expect("Should scan both roots");
    assert_eq!(left.len(), 1);
    assert_eq!(right.len(), 2);
}
