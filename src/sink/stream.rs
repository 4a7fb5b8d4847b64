//! Sink writing to a caller-supplied stream, stdout unless told otherwise.

use super::{Sink, SinkCore};
use crate::Error;
use crate::console::{self, SharedWriter};
use crate::level::{Level, LevelSpec};
use crate::registry::{Handle, Kind, Registered, Registry};
use std::fmt;
use std::io::Write;

/// Output stream bound at construction.
#[derive(Clone, Default)]
pub enum Stream {
    /// Process stdout, honouring console redirection.
    #[default]
    Stdout,
    Writer(SharedWriter),
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("Stdout"),
            Self::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

#[derive(Debug)]
pub struct StreamSink {
    core: SinkCore,
    stream: Stream,
}

impl StreamSink {
    #[must_use]
    pub fn new(name: &str, level: Level, stream: Stream) -> Self {
        Self {
            core: SinkCore::new(Kind::StreamSink, name, level),
            stream,
        }
    }

    #[must_use]
    pub const fn stream(&self) -> &Stream {
        &self.stream
    }
}

impl Registered for StreamSink {
    const KIND: Kind = Kind::StreamSink;
}

impl Sink for StreamSink {
    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn write_line(&self, line: &str) -> Result<(), Error> {
        match &self.stream {
            Stream::Stdout => console::write_stdout(line.as_bytes())?,
            Stream::Writer(writer) => {
                let mut writer = writer.lock();
                writer.write_all(line.as_bytes())?;
                writer.flush()?;
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        match &self.stream {
            Stream::Stdout => console::flush_stdout()?,
            Stream::Writer(writer) => writer.lock().flush()?,
        }
        Ok(())
    }
}

impl Registry {
    /// Stream sink registered under `name`; `stream` defaults to stdout and is
    /// ignored when the sink already exists.
    ///
    /// # Errors
    /// `InvalidLevel` for an unnormalizable level.
    pub fn stream_sink(
        &self,
        name: &str,
        level: impl Into<LevelSpec>,
        stream: Option<Stream>,
    ) -> Result<Handle<StreamSink>, Error> {
        self.get_or_create(name, level, |name, level| {
            Ok(StreamSink::new(name, level, stream.unwrap_or_default()))
        })
    }
}
