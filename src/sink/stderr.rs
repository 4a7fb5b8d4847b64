//! Sink that always writes to the process stderr.
//!
//! The stream is resolved on every write, never cached, so a console
//! redirection installed after construction still takes effect.

use super::{Sink, SinkCore};
use crate::Error;
use crate::console;
use crate::level::{Level, LevelSpec};
use crate::registry::{Handle, Kind, Registered, Registry};

#[derive(Debug)]
pub struct StdErrSink {
    core: SinkCore,
}

impl StdErrSink {
    #[must_use]
    pub fn new(name: &str, level: Level) -> Self {
        Self {
            core: SinkCore::new(Kind::StdErrSink, name, level),
        }
    }
}

impl Registered for StdErrSink {
    const KIND: Kind = Kind::StdErrSink;
}

impl Sink for StdErrSink {
    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn write_line(&self, line: &str) -> Result<(), Error> {
        console::write_stderr(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        console::flush_stderr()?;
        Ok(())
    }
}

impl Registry {
    /// Stderr sink registered under `name`.
    ///
    /// # Errors
    /// `InvalidLevel` for an unnormalizable level.
    pub fn stderr_sink(
        &self,
        name: &str,
        level: impl Into<LevelSpec>,
    ) -> Result<Handle<StdErrSink>, Error> {
        self.get_or_create(name, level, |name, level| Ok(StdErrSink::new(name, level)))
    }
}
