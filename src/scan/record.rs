use crate::utils::compute_file_hash;
use std::fs::Metadata;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Metadata for one regular file found by a scan.
///
/// The content fingerprint is computed on first request and cached for the
/// lifetime of the record, which is one run.
#[derive(Debug)]
pub struct FileRecord {
    /// `/`-separated path relative to the scanned root
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    /// Inode change time on Unix; creation time elsewhere when available
    pub changed: SystemTime,
    fingerprint: OnceLock<String>,
}

impl FileRecord {
    pub fn new(
        relative_path: String,
        absolute_path: PathBuf,
        size: u64,
        modified: SystemTime,
        changed: SystemTime,
    ) -> Self {
        Self {
            relative_path,
            absolute_path,
            size,
            modified,
            changed,
            fingerprint: OnceLock::new(),
        }
    }

    pub fn from_metadata(
        relative_path: String,
        absolute_path: PathBuf,
        metadata: &Metadata,
    ) -> io::Result<Self> {
        let modified = metadata.modified()?;
        Ok(Self::new(
            relative_path,
            absolute_path,
            metadata.len(),
            modified,
            change_time(metadata, modified),
        ))
    }

    /// SHA-256 of the file contents, hashed at most once per record
    pub fn fingerprint(&self) -> io::Result<&str> {
        if let Some(fingerprint) = self.fingerprint.get() {
            return Ok(fingerprint);
        }
        let computed = compute_file_hash(&self.absolute_path)?;
        Ok(self.fingerprint.get_or_init(|| computed))
    }

    /// The fingerprint if it has already been computed
    pub fn cached_fingerprint(&self) -> Option<&str> {
        self.fingerprint.get().map(String::as_str)
    }
}

#[cfg(unix)]
fn change_time(metadata: &Metadata, modified: SystemTime) -> SystemTime {
    use std::os::unix::fs::MetadataExt;
    use std::time::Duration;

    match (u64::try_from(metadata.ctime()), u32::try_from(metadata.ctime_nsec())) {
        (Ok(secs), Ok(nanos)) => SystemTime::UNIX_EPOCH + Duration::new(secs, nanos),
        _ => modified,
    }
}

#[cfg(not(unix))]
fn change_time(metadata: &Metadata, modified: SystemTime) -> SystemTime {
    metadata.created().unwrap_or(modified)
}
