//! Layered configuration.
//!
//! Precedence, lowest to highest: serde defaults, an optional `inofs.toml`
//! next to the working directory, `INOFS_`-prefixed environment variables.
//! CLI flags override on top of the loaded result in the binary.

use crate::error::FsError;
use crate::logging::LoggingConfig;
use crate::shell::DEFAULT_HISTORY_LIMIT;
use config::{Config, Environment, File, FileFormat, FileSourceFile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default snapshot location, relative to the working directory.
pub const DEFAULT_SNAPSHOT_PATH: &str = "filesystem.dat";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsConfig {
    /// Snapshot file the store is persisted to between sessions.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Maximum number of shell commands kept in history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_PATH)
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            history_limit: default_history_limit(),
            logging: LoggingConfig::default(),
        }
    }
}

impl FsConfig {
    /// Load configuration from `inofs.toml` (if present) and environment.
    pub fn load() -> Result<Self, FsError> {
        Self::build(File::with_name("inofs").required(false))
    }

    /// Load configuration from a specific file, still honoring environment
    /// overrides.
    pub fn load_from(path: &Path) -> Result<Self, FsError> {
        Self::build(File::from(path.to_path_buf()))
    }

    fn build(file: File<FileSourceFile, FileFormat>) -> Result<Self, FsError> {
        let merged = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("INOFS").separator("__"))
            .build()
            .map_err(|e| FsError::Config(e.to_string()))?;
        merged
            .try_deserialize()
            .map_err(|e| FsError::Config(e.to_string()))
    }
}
