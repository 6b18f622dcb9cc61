use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::core::importer::MAX_IMPORT_BYTES;
use crate::core::utils::{ensure_dir, PathResolver};
use crate::errors::PersistenceError;
use crate::storage::json_backend::save_text_to_path;

pub const DEFAULT_SAVE_THROTTLE_MS: u64 = 100;

/// Tunables read from `<data dir>/config.json`. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum spacing between durable ledger writes.
    pub save_throttle_ms: u64,
    /// Largest import file accepted, in bytes.
    pub max_import_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_throttle_ms: DEFAULT_SAVE_THROTTLE_MS,
            max_import_bytes: MAX_IMPORT_BYTES,
        }
    }
}

impl Config {
    pub fn save_throttle(&self) -> Duration {
        Duration::from_millis(self.save_throttle_ms)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, PersistenceError> {
        Self::from_base(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, PersistenceError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, PersistenceError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, PersistenceError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        save_text_to_path(&self.path, &json)
    }
}
