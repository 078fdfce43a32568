mod hash;

pub use hash::{compute_file_hash, compute_hash};

use std::path::{Component, Path, PathBuf};

/// The name of the per-user sharesync folder
pub const SHARESYNC_FOLDER: &str = ".sharesync";

/// The name of the config file inside the sharesync folder
pub const CONFIG_FILE: &str = "config.json";

/// Default follow-up log, relative to the working directory
pub const FOLLOW_UP_FILE: &str = "follow_up_tasks.md";

/// Get the path to the per-user sharesync folder (~/.sharesync)
pub fn get_sharesync_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(SHARESYNC_FOLDER))
}

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Get the current local time formatted for human-readable logs
pub fn now_local() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render a path relative to a root as a `/`-separated string.
///
/// Returns `None` for paths outside the root, with non-normal components, or
/// with a segment that is not valid UTF-8.
pub fn to_posix_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            _ => return None,
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Resolve a `/`-separated relative path under a root
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_posix_relative_nested() {
        let root = Path::new("/data/left");
        let path = root.join("a").join("b.txt");
        assert_eq!(to_posix_relative(root, &path).as_deref(), Some("a/b.txt"));
    }

    #[test]
    fn test_to_posix_relative_root_itself() {
        let root = Path::new("/data/left");
        assert_eq!(to_posix_relative(root, root), None);
    }

    #[test]
    fn test_to_posix_relative_outside_root() {
        let root = Path::new("/data/left");
        assert_eq!(to_posix_relative(root, Path::new("/data/right/x")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_to_posix_relative_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = Path::new("/data/left");
        let path = root.join("dir").join(OsStr::from_bytes(b"a\xff.txt"));
        assert_eq!(to_posix_relative(root, &path), None);
    }

    #[test]
    fn test_join_relative_round_trips() {
        let root = Path::new("/data/left");
        let joined = join_relative(root, "a/b/c.docx");
        assert_eq!(joined, root.join("a").join("b").join("c.docx"));
        assert_eq!(to_posix_relative(root, &joined).as_deref(), Some("a/b/c.docx"));
    }
}
