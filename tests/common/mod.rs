#![allow(dead_code)]

use sharesync::SyncRoots;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create `left/` and `right/` roots inside `temp`
pub fn create_roots(temp: &TempDir) -> SyncRoots {
    let left = temp.path().join("left");
    let right = temp.path().join("right");
    std::fs::create_dir_all(&left).expect("Failed to create left root");
    std::fs::create_dir_all(&right).expect("Failed to create right root");
    SyncRoots::unlabelled(left, right)
}

/// Write a file below `root`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: impl AsRef<[u8]>) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(&path, content).expect("Failed to write file");
}

/// Set the modification time to `secs` after the epoch
pub fn set_mtime(root: &Path, relative: &str, secs: u64) {
    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
    std::fs::File::options()
        .write(true)
        .open(root.join(relative))
        .expect("Failed to open file")
        .set_modified(time)
        .expect("Failed to set mtime");
}

/// Write the same file on both sides with identical timestamps
pub fn write_synced(roots: &SyncRoots, relative: &str, content: &str) {
    write_file(&roots.left.path, relative, content);
    write_file(&roots.right.path, relative, content);
    set_mtime(&roots.left.path, relative, 1_700_000_000);
    set_mtime(&roots.right.path, relative, 1_700_000_000);
}

/// Write a minimal Word document with one paragraph per entry
pub fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|text| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    let file = std::fs::File::create(path).expect("Failed to create docx");
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .expect("Failed to start zip entry");
    zip.write_all(xml.as_bytes()).expect("Failed to write zip entry");
    zip.finish().expect("Failed to finish docx");
}
