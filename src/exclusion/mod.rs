//! Exclusion filter for files and directories kept out of a sync.
//!
//! Matching is exact and case-sensitive on a single path segment: a file is
//! out of scope when its basename is an excluded file name, or when any of
//! its ancestor directories is an excluded directory name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Excluded file and directory basenames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionSet {
    #[serde(default)]
    pub excluded_files: BTreeSet<String>,
    #[serde(default)]
    pub excluded_dirs: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from file and directory name lists
    pub fn from_names<F, D>(files: F, dirs: D) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            excluded_files: files.into_iter().map(Into::into).collect(),
            excluded_dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a `/`-separated relative file path is out of scope
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        let mut segments: Vec<&str> = relative_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let Some(basename) = segments.pop() else {
            return false;
        };

        self.excluded_files.contains(basename)
            || segments.iter().any(|dir| self.excluded_dirs.contains(*dir))
    }

    /// Whether the walker must not descend into a directory with this name
    pub fn is_excluded_dir(&self, dir_name: &str) -> bool {
        self.excluded_dirs.contains(dir_name)
    }

    /// Returns true if the file name was not already excluded
    pub fn add_file(&mut self, name: impl Into<String>) -> bool {
        self.excluded_files.insert(name.into())
    }

    /// Returns true if the directory name was not already excluded
    pub fn add_dir(&mut self, name: impl Into<String>) -> bool {
        self.excluded_dirs.insert(name.into())
    }

    /// Returns true if the file name was excluded before the call
    pub fn remove_file(&mut self, name: &str) -> bool {
        self.excluded_files.remove(name)
    }

    /// Returns true if the directory name was excluded before the call
    pub fn remove_dir(&mut self, name: &str) -> bool {
        self.excluded_dirs.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.excluded_files.is_empty() && self.excluded_dirs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExclusionSet {
        ExclusionSet::from_names(["Thumbs.db", "~$draft.docx"], ["excluded_dir", ".git"])
    }

    #[test]
    fn test_excludes_by_basename() {
        let set = sample();
        assert!(set.is_excluded("Thumbs.db"));
        assert!(set.is_excluded("photos/2024/Thumbs.db"));
        assert!(!set.is_excluded("photos/thumbs.db"));
    }

    #[test]
    fn test_excludes_by_any_ancestor_dir() {
        let set = sample();
        assert!(set.is_excluded("excluded_dir/a.txt"));
        assert!(set.is_excluded("deep/nested/excluded_dir/more/b.txt"));
        assert!(set.is_excluded(".git/config"));
    }

    #[test]
    fn test_dir_name_as_file_name_is_not_excluded() {
        let set = sample();
        // Only ancestor segments are checked against the directory set
        assert!(!set.is_excluded("reports/excluded_dir"));
    }

    #[test]
    fn test_no_globbing_or_partial_matches() {
        let set = sample();
        assert!(!set.is_excluded("excluded_dir_2/a.txt"));
        assert!(!set.is_excluded("my_excluded_dir/a.txt"));
        assert!(!set.is_excluded("Thumbs.db.bak"));
    }

    #[test]
    fn test_empty_path_is_not_excluded() {
        assert!(!sample().is_excluded(""));
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut set = ExclusionSet::new();
        assert!(set.add_dir("build"));
        assert!(!set.add_dir("build"));
        assert!(set.add_file("notes.txt"));
        assert!(!set.add_file("notes.txt"));

        assert!(set.remove_dir("build"));
        assert!(!set.remove_dir("build"));
        assert!(!set.remove_file("missing.txt"));
        assert!(set.remove_file("notes.txt"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let set = ExclusionSet::from_names(["a.txt"], ["tmp"]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["excludedFiles"][0], "a.txt");
        assert_eq!(json["excludedDirs"][0], "tmp");
    }
}
