//! Configuration struct definitions.

use serde::Deserialize;

/// Settings shared by every logger and sink.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default level: a name from the level table or an integer ordinal.
    pub level: toml::Value,
    /// Directory that relative file sink paths resolve against.
    pub log_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        let log_dir = directories::ProjectDirs::from("", "", "logbytes").map_or_else(
            || "logs".to_string(),
            |dirs| {
                dirs.state_dir()
                    .unwrap_or_else(|| dirs.data_dir())
                    .join("logs")
                    .to_string_lossy()
                    .into_owned()
            },
        );

        Self {
            level: toml::Value::String("INFO".to_string()),
            log_dir,
        }
    }
}

/// Stderr sink configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StdErrConfig {
    pub enabled: bool,
    /// Falls back to the general level.
    pub level: Option<toml::Value>,
}

impl Default for StdErrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: None,
        }
    }
}

/// File sink configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    /// Relative names resolve against `general.log_dir`.
    pub filename: String,
    /// append, write or binary.
    pub mode: String,
    /// utf-8 or latin-1. Ignored in binary mode.
    pub encoding: Option<String>,
    /// Open on first emit instead of at construction.
    pub delay: bool,
    /// Falls back to NOTSET so the logger's level decides.
    pub level: Option<toml::Value>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filename: "logbytes.log".to_string(),
            mode: "append".to_string(),
            encoding: None,
            delay: false,
            level: None,
        }
    }
}
