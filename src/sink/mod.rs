//! Sinks bind a named, level-gated instance to one output target.
//!
//! Three variants cover the targets a dotfiles toolkit writes to: an arbitrary
//! stream (stdout by default), a file, and the process stderr. Each filters by
//! its own level, writes outside any registry lock, and refuses to write once
//! closed.

mod file;
mod stderr;
mod stream;

pub use file::{Encoding, FileMode, FileSink, FileTarget};
pub use stderr::StdErrSink;
pub use stream::{Stream, StreamSink};

use crate::Error;
use crate::fmt::Formatter;
use crate::level::{self, Level, LevelSpec};
use crate::registry::Kind;
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Line terminator appended to every emitted record.
pub const TERMINATOR: &str = "\n";

/// One emission request as it reaches a sink.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    /// Name of the logger that produced the record.
    pub name: String,
    /// Already-formatted message text. Sinks never style it.
    pub message: String,
    pub created: DateTime<Local>,
}

impl LogRecord {
    #[must_use]
    pub fn new(level: Level, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            name: name.into(),
            message: message.into(),
            created: Local::now(),
        }
    }
}

/// State every sink variant carries: identity, level, closed flag, formatter.
#[derive(Debug)]
pub struct SinkCore {
    kind: Kind,
    name: String,
    level: AtomicI32,
    closed: AtomicBool,
    formatter: RwLock<Option<Formatter>>,
}

impl SinkCore {
    #[must_use]
    pub fn new(kind: Kind, name: &str, level: Level) -> Self {
        Self {
            kind,
            name: name.to_string(),
            level: AtomicI32::new(level.ordinal()),
            closed: AtomicBool::new(false),
            formatter: RwLock::new(None),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn level(&self) -> Level {
        Level::from_ordinal(self.level.load(Ordering::Acquire))
    }

    /// # Errors
    /// `InvalidLevel` if `level` does not normalize; the stored level is unchanged.
    pub fn set_level(&self, level: impl Into<LevelSpec>) -> Result<Level, Error> {
        let level = level::normalize(level)?;
        self.level.store(level.ordinal(), Ordering::Release);
        Ok(level)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns true on the transition to closed, false if already closed.
    pub fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// # Errors
    /// `SinkClosed` once `close` has been called.
    pub fn ensure_open(&self) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::SinkClosed {
                kind: self.kind,
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn set_formatter(&self, formatter: Option<Formatter>) {
        *self.formatter.write() = formatter;
    }

    #[must_use]
    pub fn formatter(&self) -> Option<Formatter> {
        self.formatter.read().clone()
    }

    /// Formatted line including the terminator.
    #[must_use]
    pub fn render(&self, record: &LogRecord) -> String {
        let mut line = match &*self.formatter.read() {
            Some(formatter) => formatter.format(record),
            None => record.message.clone(),
        };
        line.push_str(TERMINATOR);
        line
    }
}

/// Capability set shared by every sink variant.
pub trait Sink: Send + Sync {
    fn core(&self) -> &SinkCore;

    /// Writes one rendered line to the target. Called only for records that pass the level.
    ///
    /// # Errors
    /// `SinkClosed` if the sink closed concurrently, or the target's write error.
    fn write_line(&self, line: &str) -> Result<(), Error>;

    /// # Errors
    /// I/O errors from the target.
    fn flush(&self) -> Result<(), Error>;

    fn kind(&self) -> Kind {
        self.core().kind()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn level(&self) -> Level {
        self.core().level()
    }

    fn is_closed(&self) -> bool {
        self.core().is_closed()
    }

    /// Idempotent. A closed sink never reopens.
    fn close(&self) {
        self.core().close();
    }

    /// Returns `Ok(true)` if written, `Ok(false)` if filtered by level.
    ///
    /// # Errors
    /// `SinkClosed` after `close`, and any error from the target.
    fn emit(&self, record: &LogRecord) -> Result<bool, Error> {
        let core = self.core();
        core.ensure_open()?;
        if !core.level().permits(record.level) {
            return Ok(false);
        }
        self.write_line(&core.render(record))?;
        Ok(true)
    }
}
