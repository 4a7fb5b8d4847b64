//! TOML configuration plus the two environment overrides the core consumes:
//! the default level and the default log directory.
//!
//! Read once at startup and handed to sink and logger construction; nothing in
//! the registry reads configuration on its own.

mod structs;

pub use structs::{FileConfig, GeneralConfig, StdErrConfig};

use crate::Error;
use crate::internal;
use crate::level::{self, Level};
use crate::sink::{FileMode, FileTarget};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides `general.level`.
pub const LEVEL_ENV: &str = "LOGBYTES_LEVEL";
/// Overrides `general.log_dir`.
pub const LOG_DIR_ENV: &str = "LOGBYTES_LOG_DIR";

/// An empty file still yields a working setup: every field has a default.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub stderr: StdErrConfig,
    pub file: FileConfig,
}

impl Config {
    /// Loads the default config file, then applies environment overrides.
    ///
    /// # Errors
    /// Fails if the config directory can't be determined or TOML parsing hits a syntax error.
    pub fn load() -> Result<Self, crate::Error> {
        let path = Self::get_config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads from an explicit path. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, crate::Error> {
        if !path.exists() {
            internal::debug("CONFIG", "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config = Self::parse(&fs::read_to_string(path)?)?;
        internal::info("CONFIG", &format!("Config loaded from {}", path.display()));
        Ok(config)
    }

    /// # Errors
    /// TOML syntax or type errors.
    pub fn parse(content: &str) -> Result<Self, crate::Error> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `LOGBYTES_LEVEL` and `LOGBYTES_LOG_DIR` through `lookup`.
    ///
    /// A numeric level string is taken as an ordinal.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup(LEVEL_ENV) {
            internal::debug("CONFIG", &format!("{LEVEL_ENV}={level}"));
            self.general.level = level.trim().parse::<i64>().map_or_else(
                |_| toml::Value::String(level.clone()),
                toml::Value::Integer,
            );
        }
        if let Some(dir) = lookup(LOG_DIR_ENV) {
            internal::debug("CONFIG", &format!("{LOG_DIR_ENV}={dir}"));
            self.general.log_dir = dir;
        }
    }

    /// `<config dir>/logbytes/config.toml`.
    ///
    /// # Errors
    /// Fails when the platform has no concept of a config directory.
    pub fn get_config_path() -> Result<PathBuf, crate::Error> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("logbytes").join("config.toml"))
            .ok_or(crate::Error::ConfigDirNotFound)
    }

    /// # Errors
    /// `InvalidLevel` if `general.level` does not normalize.
    pub fn level(&self) -> Result<Level, Error> {
        level::normalize(&self.general.level)
    }

    /// # Errors
    /// `InvalidLevel` if the stderr or general level does not normalize.
    pub fn stderr_level(&self) -> Result<Level, Error> {
        match &self.stderr.level {
            Some(level) => level::normalize(level),
            None => self.level(),
        }
    }

    /// # Errors
    /// `InvalidLevel` if the file level does not normalize.
    pub fn file_level(&self) -> Result<Level, Error> {
        match &self.file.level {
            Some(level) => level::normalize(level),
            None => Ok(Level::NOTSET),
        }
    }

    /// Log directory with `~` expanded.
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.general.log_dir).into_owned())
    }

    /// File sink target described by the `[file]` section.
    ///
    /// # Errors
    /// Unknown mode or encoding names.
    pub fn file_target(&self) -> Result<FileTarget, Error> {
        let mode: FileMode = self.file.mode.parse()?;
        let mut target = FileTarget::new(shellexpand::tilde(&self.file.filename).into_owned())
            .base_dir(self.log_dir())
            .mode(mode)
            .delay(self.file.delay);
        if let Some(encoding) = &self.file.encoding {
            target = target.encoding(encoding.parse()?);
        }
        Ok(target)
    }
}
