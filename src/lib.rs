//! `logbytes` - named loggers and sinks for a personal dotfiles toolkit.
//!
//! Loggers and sinks are multitons: a [`Registry`] hands out exactly one live
//! instance per (kind, name), constructing it on first request. Sinks write
//! level-gated, already-formatted text to stdout, stderr, any stream, or a
//! file; loggers fan records out to the sinks attached to them.
//!
//! # Example
//!
//! ```
//! use logbytes::{Kind, Level, Registry};
//!
//! let registry = Registry::new();
//! // A new logger prints to stderr through a sink of the same name.
//! let logger = registry.logger("app", Level::INFO)?;
//! let delivery = logger.error("disk almost full")?;
//! assert!(delivery.is_clean());
//! assert_eq!(delivery.delivered.len(), 1);
//!
//! // More sinks can be attached by name.
//! let audit = registry.stream_sink("audit", "WARNING", None)?;
//! logger.attach(&audit);
//! assert_eq!(logger.sinks().len(), 2);
//!
//! // Same name, same instance.
//! let again = registry.logger("app", Level::INFO)?;
//! assert!(again.same_instance(&logger));
//! assert_eq!(registry.count(Kind::StdErrSink), 1);
//! # Ok::<(), logbytes::Error>(())
//! ```

pub mod config;
pub mod console;
mod error;
pub mod fmt;
pub mod internal;
pub mod level;
pub mod logger;
pub mod registry;
pub mod sink;

// Re-exports for convenience
pub use config::Config;
pub use error::Error;
pub use fmt::Formatter;
pub use level::{Level, LevelSpec, normalize};
pub use logger::{Delivery, Logger, SinkFailure, SinkRef};
pub use registry::{Handle, InstanceId, Kind, Registered, Registry, global};
pub use sink::{
    Encoding, FileMode, FileSink, FileTarget, LogRecord, Sink, StdErrSink, Stream, StreamSink,
};
