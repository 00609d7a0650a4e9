//! Runtime configuration for directory hosts.
//!
//! # Responsibility
//! - Layer defaults, `USERDIR_*` environment variables and command-line
//!   flags (in rising precedence) through `ortho_config`.
//! - Resolve unset or blank values to the directory defaults.
//!
//! # Invariants
//! - Malformed values fail loading instead of being silently ignored.

use crate::db::DEFAULT_BUSY_TIMEOUT;
use crate::logging::default_log_level;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "db/users.sqlite3";

/// Settings needed to bootstrap a directory host.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERDIR")]
pub struct DirectoryConfig {
    /// SQLite database file; its directory is created on open.
    pub db_path: Option<PathBuf>,
    /// `trace|debug|info|warn|error`.
    pub log_level: Option<String>,
    /// Absolute log directory. Unset disables file logging.
    pub log_dir: Option<PathBuf>,
    /// How long a statement waits on a locked database.
    pub busy_timeout_ms: Option<u64>,
}

impl DirectoryConfig {
    /// Database file, falling back to `db/users.sqlite3`.
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    /// Log level, falling back to the build-mode default.
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| default_log_level())
    }

    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_BUSY_TIMEOUT)
    }
}
