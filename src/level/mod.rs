//! Severity levels that gate which records reach which sinks.
//!
//! Callers hand levels in as ordinals, as names from the level table, or as
//! untyped config values. Everything is folded into one canonical ordinal by
//! [`normalize`] before it is stored anywhere.

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// Canonical level: the normalized integer ordinal.
///
/// Ordinals outside the table are legal custom levels; ordering is plain integer ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(i32);

impl Level {
    pub const NOTSET: Self = Self(0);
    pub const DEBUG: Self = Self(10);
    pub const INFO: Self = Self(20);
    pub const WARNING: Self = Self(30);
    pub const ERROR: Self = Self(40);
    pub const CRITICAL: Self = Self(50);

    /// Wraps a raw ordinal without consulting the table.
    #[must_use]
    pub const fn from_ordinal(ordinal: i32) -> Self {
        Self(ordinal)
    }

    #[must_use]
    pub const fn ordinal(self) -> i32 {
        self.0
    }

    /// Table name for known ordinals, `None` for custom levels.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("NOTSET"),
            10 => Some("DEBUG"),
            20 => Some("INFO"),
            30 => Some("WARNING"),
            40 => Some("ERROR"),
            50 => Some("CRITICAL"),
            _ => None,
        }
    }

    /// The named levels in ascending order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::NOTSET,
            Self::DEBUG,
            Self::INFO,
            Self::WARNING,
            Self::ERROR,
            Self::CRITICAL,
        ]
    }

    /// Threshold check shared by loggers and sinks.
    #[must_use]
    pub fn permits(self, record_level: Self) -> bool {
        record_level >= self
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Level {}", self.0),
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NOTSET" => Ok(Self::NOTSET),
            "DEBUG" => Ok(Self::DEBUG),
            "INFO" => Ok(Self::INFO),
            "WARNING" | "WARN" => Ok(Self::WARNING),
            "ERROR" => Ok(Self::ERROR),
            "CRITICAL" | "FATAL" => Ok(Self::CRITICAL),
            _ => Err(Error::InvalidLevel(format!("unknown level name '{s}'"))),
        }
    }
}

/// Raw, not-yet-validated level input.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelSpec {
    Ordinal(i64),
    Name(String),
    Canonical(Level),
    /// Anything else a config source produced (floats, booleans, tables).
    Other(String),
}

impl From<Level> for LevelSpec {
    fn from(level: Level) -> Self {
        Self::Canonical(level)
    }
}

impl From<i32> for LevelSpec {
    fn from(ordinal: i32) -> Self {
        Self::Ordinal(i64::from(ordinal))
    }
}

impl From<i64> for LevelSpec {
    fn from(ordinal: i64) -> Self {
        Self::Ordinal(ordinal)
    }
}

impl From<&str> for LevelSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for LevelSpec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&toml::Value> for LevelSpec {
    fn from(value: &toml::Value) -> Self {
        match value {
            toml::Value::Integer(i) => Self::Ordinal(*i),
            toml::Value::String(s) => Self::Name(s.clone()),
            other => Self::Other(format!("{} {other}", other.type_str())),
        }
    }
}

/// Folds any level input into its canonical ordinal.
///
/// Idempotent: a canonical level normalizes to itself.
///
/// # Errors
/// `InvalidLevel` for names outside the table, ordinals outside `i32`, and
/// inputs that are neither integers nor strings.
pub fn normalize(level: impl Into<LevelSpec>) -> Result<Level, Error> {
    match level.into() {
        LevelSpec::Canonical(level) => Ok(level),
        LevelSpec::Ordinal(ordinal) => i32::try_from(ordinal)
            .map(Level)
            .map_err(|_| Error::InvalidLevel(format!("ordinal {ordinal} out of range"))),
        LevelSpec::Name(name) => name.parse(),
        LevelSpec::Other(desc) => Err(Error::InvalidLevel(format!(
            "level must be an integer or a string, got {desc}"
        ))),
    }
}
