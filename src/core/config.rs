//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{DeleteAfterError, Result};
use crate::core::paths::{expand_home, home_dir};

/// System-wide log destination, used when writable.
pub const SYSTEM_LOG_PATH: &str = "/var/log/delete_after.log";
/// Per-user log destination used when the system path is not writable.
pub const USER_LOG_PATH: &str = "~/delete_after.log";

/// Full delete-after configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSettings,
    pub logging: LoggingConfig,
}

/// Scan behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ScanSettings {
    /// Log intended deletions without touching the filesystem.
    pub dry_run: bool,
    /// Include per-file keep/skip decisions in the log.
    pub verbose: bool,
}

/// Log file destinations and rotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub path: PathBuf,
    pub fallback_path: Option<PathBuf>,
    /// Echo log records to stdout as well as the log file.
    pub echo_stdout: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(SYSTEM_LOG_PATH),
            fallback_path: Some(PathBuf::from(USER_LOG_PATH)),
            echo_stdout: true,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        home_dir()
            .join(".config")
            .join("delete-after")
            .join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |name| env::var(name).ok())
    }

    /// Same as [`Config::load`] with an explicit environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| DeleteAfterError::io(&path_buf, source))?;
            toml::from_str::<Self>(&raw)?
        } else if is_explicit_path {
            return Err(DeleteAfterError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(lookup)?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut var = |name: &str| lookup(name).filter(|raw| !raw.trim().is_empty());

        if let Some(raw) = var("DELETE_AFTER_DRY_RUN") {
            self.scan.dry_run = parse_env_bool("DELETE_AFTER_DRY_RUN", &raw)?;
        }
        if let Some(raw) = var("DELETE_AFTER_VERBOSE") {
            self.scan.verbose = parse_env_bool("DELETE_AFTER_VERBOSE", &raw)?;
        }
        if let Some(raw) = var("DELETE_AFTER_LOG_FILE") {
            self.logging.path = PathBuf::from(raw.trim());
        }
        if let Some(raw) = var("DELETE_AFTER_FALLBACK_LOG_FILE") {
            self.logging.fallback_path = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = var("DELETE_AFTER_LOG_STDOUT") {
            self.logging.echo_stdout = parse_env_bool("DELETE_AFTER_LOG_STDOUT", &raw)?;
        }
        if let Some(raw) = var("DELETE_AFTER_LOG_MAX_SIZE_BYTES") {
            self.logging.max_size_bytes = parse_env_u64("DELETE_AFTER_LOG_MAX_SIZE_BYTES", &raw)?;
        }
        if let Some(raw) = var("DELETE_AFTER_LOG_MAX_ROTATED_FILES") {
            self.logging.max_rotated_files =
                raw.trim()
                    .parse::<u32>()
                    .map_err(|error| DeleteAfterError::ConfigParse {
                        context: "env",
                        details: format!("DELETE_AFTER_LOG_MAX_ROTATED_FILES={raw:?}: {error}"),
                    })?;
        }
        Ok(())
    }

    fn normalize_paths(&mut self) {
        self.logging.path = expand_home(&self.logging.path);
        if let Some(fallback) = self.logging.fallback_path.as_mut() {
            *fallback = expand_home(fallback);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.logging.path.as_os_str().is_empty() {
            return Err(DeleteAfterError::InvalidConfig {
                details: "logging.path must not be empty".to_string(),
            });
        }
        if self
            .logging
            .fallback_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(DeleteAfterError::InvalidConfig {
                details: "logging.fallback_path must not be empty when set".to_string(),
            });
        }
        if self.logging.max_size_bytes == 0 {
            return Err(DeleteAfterError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|error| DeleteAfterError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DeleteAfterError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: expected a boolean"),
        }),
    }
}
