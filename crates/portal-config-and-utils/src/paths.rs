//! File system paths for the portal client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Directory under the user's home that holds all portal state.
const BASE_DIR_NAME: &str = ".mentor-portal";

/// Manages file system paths for the portal client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for portal files (~/.mentor-portal)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.mentor-portal`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.mentor-portal).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.mentor-portal/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the persisted key-value storage path (~/.mentor-portal/storage.json).
    /// Holds the token pair and the transient password-reset keys.
    pub fn storage_file(&self) -> PathBuf {
        self.base_dir.join("storage.json")
    }

    /// Get the logs directory (~/.mentor-portal/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the central log file path (~/.mentor-portal/logs/portal.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("portal.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
