use super::types::SyncConfig;
use super::ConfigError;
use crate::utils::{get_sharesync_dir, CONFIG_FILE};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Location of the persisted profiles and exclusions
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at ~/.sharesync/config.json
    pub fn default_location() -> Result<Self, ConfigError> {
        let dir = get_sharesync_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::at(dir.join(CONFIG_FILE)))
    }

    /// Store at an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config from disk, or a fresh one if the file does not exist
    pub async fn read(&self) -> Result<SyncConfig, ConfigError> {
        if !self.path.exists() {
            return Ok(SyncConfig::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        let config: SyncConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Write the config to disk atomically
    pub async fn write(&self, config: &SyncConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file + rename
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}
