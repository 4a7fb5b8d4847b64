//! Unified error type for all logbytes operations.

use crate::registry::Kind;

/// Error type for logbytes operations.
#[derive(Debug)]
pub enum Error {
    /// Level input is not in the level table, or is neither an integer nor a string.
    InvalidLevel(String),
    /// The target resource of a sink could not be acquired.
    Construction {
        kind: Kind,
        name: String,
        source: std::io::Error,
    },
    /// Emission attempted on a closed sink or logger.
    SinkClosed { kind: Kind, name: String },
    /// A logger references a sink name that is no longer registered.
    SinkMissing { kind: Kind, name: String },
    /// The registered instance under this name has a different type than requested.
    KindMismatch { kind: Kind, name: String },
    /// Unknown file mode or encoding name.
    InvalidTarget(String),
    /// Timestamp pattern that chrono cannot render.
    InvalidFormat(String),
    /// Text cannot be represented in the sink's encoding.
    Encoding { encoding: &'static str, ch: char },
    /// I/O error.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(level) => write!(f, "invalid level: {level}"),
            Self::Construction { kind, name, source } => {
                write!(f, "cannot construct {kind} '{name}': {source}")
            }
            Self::SinkClosed { kind, name } => write!(f, "{kind} '{name}' is closed"),
            Self::SinkMissing { kind, name } => write!(f, "{kind} '{name}' is not registered"),
            Self::KindMismatch { kind, name } => {
                write!(f, "{kind} '{name}' is registered with a different type")
            }
            Self::InvalidTarget(msg) => write!(f, "invalid file target: {msg}"),
            Self::InvalidFormat(pattern) => write!(f, "invalid timestamp format: {pattern}"),
            Self::Encoding { encoding, ch } => {
                write!(f, "character {ch:?} cannot be encoded as {encoding}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Construction { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}
