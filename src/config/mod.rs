//! Persisted profiles and exclusions.
//!
//! The core never reads this store itself; the CLI loads a profile and an
//! [`ExclusionSet`] from it and passes them in.

mod storage;
mod types;

pub use storage::ConfigStore;
pub use types::{SyncConfig, SyncProfile};

use crate::exclusion::ExclusionSet;
use crate::utils::now_iso;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to determine home directory")]
    HomeDirNotFound,

    #[error("Profile '{0}' not found. Run 'setup' first.")]
    ProfileNotFound(String),

    #[error("Directory '{0}' does not exist")]
    DirectoryNotFound(PathBuf),
}

impl ConfigStore {
    pub async fn load_profile(&self, name: &str) -> Result<SyncProfile, ConfigError> {
        let config = self.read().await?;
        config
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Add or replace a profile. Both directories must exist.
    pub async fn save_profile(&self, name: &str, profile: SyncProfile) -> Result<(), ConfigError> {
        for dir in [&profile.left_dir, &profile.right_dir] {
            if !dir.is_dir() {
                return Err(ConfigError::DirectoryNotFound(dir.clone()));
            }
        }

        let profile = SyncProfile {
            left_dir: profile.left_dir.canonicalize()?,
            right_dir: profile.right_dir.canonicalize()?,
            ..profile
        };

        let mut config = self.read().await?;
        config.profiles.insert(name.to_string(), profile);
        config.updated_at = now_iso();
        self.write(&config).await
    }

    pub async fn remove_profile(&self, name: &str) -> Result<(), ConfigError> {
        let mut config = self.read().await?;
        if config.profiles.remove(name).is_none() {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        config.updated_at = now_iso();
        self.write(&config).await
    }

    pub async fn list_profiles(&self) -> Result<Vec<(String, SyncProfile)>, ConfigError> {
        let config = self.read().await?;
        Ok(config.profiles.into_iter().collect())
    }

    pub async fn load_exclusion_set(&self) -> Result<ExclusionSet, ConfigError> {
        Ok(self.read().await?.exclusions)
    }

    pub async fn save_exclusion_set(&self, exclusions: &ExclusionSet) -> Result<(), ConfigError> {
        let mut config = self.read().await?;
        config.exclusions = exclusions.clone();
        config.updated_at = now_iso();
        self.write(&config).await
    }

    /// Returns true if the directory name was newly excluded
    pub async fn exclude_dir(&self, name: &str) -> Result<bool, ConfigError> {
        self.update_exclusions(|set| set.add_dir(name)).await
    }

    /// Returns true if the file name was newly excluded
    pub async fn exclude_file(&self, name: &str) -> Result<bool, ConfigError> {
        self.update_exclusions(|set| set.add_file(name)).await
    }

    /// Returns true if the directory name was excluded before
    pub async fn include_dir(&self, name: &str) -> Result<bool, ConfigError> {
        self.update_exclusions(|set| set.remove_dir(name)).await
    }

    /// Returns true if the file name was excluded before
    pub async fn include_file(&self, name: &str) -> Result<bool, ConfigError> {
        self.update_exclusions(|set| set.remove_file(name)).await
    }

    /// Apply `change` and persist only if it reports a modification
    async fn update_exclusions<F>(&self, change: F) -> Result<bool, ConfigError>
    where
        F: FnOnce(&mut ExclusionSet) -> bool,
    {
        let mut exclusions = self.load_exclusion_set().await?;
        if !change(&mut exclusions) {
            return Ok(false);
        }
        self.save_exclusion_set(&exclusions).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_location_ends_with_config_file() {
        // This test will work if HOME or USERPROFILE is set
        if let Ok(store) = ConfigStore::default_location() {
            assert!(store.path().ends_with("config.json"));
            assert!(store.path().to_string_lossy().contains(".sharesync"));
        }
    }

    #[test]
    fn test_sync_config_new() {
        let config = SyncConfig::new();
        assert_eq!(config.schema_version, 1);
        assert!(config.profiles.is_empty());
        assert!(config.exclusions.is_empty());
        assert!(!config.updated_at.is_empty());
    }

    #[test]
    fn test_parses_minimal_document() {
        let config: SyncConfig = serde_json::from_str(
            r#"{
                "schemaVersion": 1,
                "excludedDirs": ["Archive"],
                "profiles": {
                    "acme": { "leftDir": "/srv/kis", "rightDir": "/srv/acme" }
                }
            }"#,
        )
        .unwrap();

        assert!(config.exclusions.is_excluded_dir("Archive"));
        assert_eq!(config.fingerprint_workers, 4);
        let profile = &config.profiles["acme"];
        assert_eq!(profile.left_label, "left");
        assert_eq!(profile.roots().right.path, PathBuf::from("/srv/acme"));
    }
}
