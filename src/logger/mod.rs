//! Named logger that fans each record out to its attached sinks.
//!
//! A logger references sinks by (kind, name) and resolves them through its
//! registry on every emit, so the registry stays their only owner. One failing
//! sink never stops delivery to the rest: failures are collected into the
//! returned [`Delivery`].

mod from_config;

use crate::Error;
use crate::level::{self, Level, LevelSpec};
use crate::registry::{Handle, Kind, Registered, Registry, Shared};
use crate::sink::{FileSink, LogRecord, Sink, StdErrSink, StreamSink};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Weak};

/// Non-owning reference to a registered sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SinkRef {
    pub kind: Kind,
    pub name: String,
}

impl SinkRef {
    #[must_use]
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for SinkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// A sink that could not take a record.
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: SinkRef,
    pub error: Error,
}

/// Per-sink outcome of one [`Logger::emit`].
#[derive(Debug, Default)]
pub struct Delivery {
    pub delivered: Vec<SinkRef>,
    /// Sinks whose own level rejected the record.
    pub filtered: Vec<SinkRef>,
    pub failures: Vec<SinkFailure>,
}

impl Delivery {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Logger {
    name: String,
    level: AtomicI32,
    closed: AtomicBool,
    sinks: RwLock<Vec<SinkRef>>,
    registry: Weak<Shared>,
}

impl Logger {
    fn new(name: &str, level: Level, registry: Weak<Shared>) -> Self {
        Self {
            name: name.to_string(),
            level: AtomicI32::new(level.ordinal()),
            closed: AtomicBool::new(false),
            sinks: RwLock::new(Vec::new()),
            registry,
        }
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

    /// Whether a record at `level` would pass this logger's own threshold.
    #[must_use]
    pub fn is_enabled_for(&self, level: Level) -> bool {
        self.level().permits(level)
    }

    /// Attaches a sink by name. Returns false if it was already attached.
    pub fn attach<S: Sink + Registered>(&self, sink: &Handle<S>) -> bool {
        self.attach_ref(SinkRef::new(S::KIND, sink.name()))
    }

    /// Attaches a sink that may not be registered yet; it is resolved on emit.
    pub fn attach_ref(&self, sink: SinkRef) -> bool {
        let mut sinks = self.sinks.write();
        if sinks.contains(&sink) {
            return false;
        }
        sinks.push(sink);
        true
    }

    /// Returns false if the sink was not attached.
    pub fn detach(&self, kind: Kind, name: &str) -> bool {
        let mut sinks = self.sinks.write();
        let before = sinks.len();
        sinks.retain(|s| !(s.kind == kind && s.name == name));
        sinks.len() != before
    }

    /// Attached sinks in attachment order.
    #[must_use]
    pub fn sinks(&self) -> Vec<SinkRef> {
        self.sinks.read().clone()
    }

    #[must_use]
    pub fn has_sinks(&self) -> bool {
        !self.sinks.read().is_empty()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Idempotent. Attached sinks stay open; the registry owns them.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn resolve(&self, sink: &SinkRef) -> Option<Arc<dyn Sink>> {
        let registry = self.registry.upgrade()?;
        match sink.kind {
            Kind::StreamSink => registry
                .instance::<StreamSink>(&sink.name)
                .map(|s| s as Arc<dyn Sink>),
            Kind::FileSink => registry
                .instance::<FileSink>(&sink.name)
                .map(|s| s as Arc<dyn Sink>),
            Kind::StdErrSink => registry
                .instance::<StdErrSink>(&sink.name)
                .map(|s| s as Arc<dyn Sink>),
            Kind::Logger => None,
        }
    }

    /// Normalizes `level`, then offers the record to every attached sink if
    /// this logger's level permits it.
    ///
    /// # Errors
    /// `InvalidLevel` for an unnormalizable level, `SinkClosed` after `close`.
    /// Per-sink problems are reported in [`Delivery::failures`] instead.
    pub fn emit(&self, level: impl Into<LevelSpec>, message: &str) -> Result<Delivery, Error> {
        let level = level::normalize(level)?;
        if self.is_closed() {
            return Err(Error::SinkClosed {
                kind: Kind::Logger,
                name: self.name.clone(),
            });
        }

        let mut delivery = Delivery::default();
        if !self.is_enabled_for(level) {
            return Ok(delivery);
        }

        let record = LogRecord::new(level, &self.name, message);
        // Snapshot so no lock is held across sink writes.
        let sinks = self.sinks();
        for sink_ref in sinks {
            let Some(sink) = self.resolve(&sink_ref) else {
                delivery.failures.push(SinkFailure {
                    error: Error::SinkMissing {
                        kind: sink_ref.kind,
                        name: sink_ref.name.clone(),
                    },
                    sink: sink_ref,
                });
                continue;
            };
            match sink.emit(&record) {
                Ok(true) => delivery.delivered.push(sink_ref),
                Ok(false) => delivery.filtered.push(sink_ref),
                Err(error) => delivery.failures.push(SinkFailure {
                    sink: sink_ref,
                    error,
                }),
            }
        }
        Ok(delivery)
    }

    /// # Errors
    /// See [`Logger::emit`].
    pub fn debug(&self, message: &str) -> Result<Delivery, Error> {
        self.emit(Level::DEBUG, message)
    }

    /// # Errors
    /// See [`Logger::emit`].
    pub fn info(&self, message: &str) -> Result<Delivery, Error> {
        self.emit(Level::INFO, message)
    }

    /// # Errors
    /// See [`Logger::emit`].
    pub fn warning(&self, message: &str) -> Result<Delivery, Error> {
        self.emit(Level::WARNING, message)
    }

    /// # Errors
    /// See [`Logger::emit`].
    pub fn error(&self, message: &str) -> Result<Delivery, Error> {
        self.emit(Level::ERROR, message)
    }

    /// # Errors
    /// See [`Logger::emit`].
    pub fn critical(&self, message: &str) -> Result<Delivery, Error> {
        self.emit(Level::CRITICAL, message)
    }

    /// Flushes every attached sink that is still registered.
    ///
    /// # Errors
    /// Returns the first I/O error encountered across all sinks.
    pub fn flush(&self) -> Result<(), Error> {
        for sink_ref in self.sinks() {
            if let Some(sink) = self.resolve(&sink_ref) {
                sink.flush()?;
            }
        }
        Ok(())
    }
}

impl Registered for Logger {
    const KIND: Kind = Kind::Logger;
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("closed", &self.is_closed())
            .field("sinks", &*self.sinks.read())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Logger registered under `name`.
    ///
    /// On first construction a [`StdErrSink`] of the same name is registered at
    /// the logger's level and attached, so a fresh logger prints. If that sink
    /// already exists it is reused as-is. An existing logger is returned
    /// unchanged, whatever sinks it has by then.
    ///
    /// The logger resolves its sinks through this registry; once every clone
    /// of the registry is dropped its sinks report as missing.
    ///
    /// # Errors
    /// `InvalidLevel` for an unnormalizable level.
    pub fn logger(&self, name: &str, level: impl Into<LevelSpec>) -> Result<Handle<Logger>, Error> {
        let registry = self.downgrade();
        self.get_or_create(name, level, move |name, level| {
            let logger = Logger::new(name, level, registry);
            let sink = self.stderr_sink(name, level)?;
            logger.attach(&sink);
            Ok(logger)
        })
    }

    /// Like [`Registry::logger`], but a newly created logger starts with no
    /// sinks attached.
    ///
    /// # Errors
    /// `InvalidLevel` for an unnormalizable level.
    pub fn bare_logger(
        &self,
        name: &str,
        level: impl Into<LevelSpec>,
    ) -> Result<Handle<Logger>, Error> {
        let registry = self.downgrade();
        self.get_or_create(name, level, move |name, level| {
            Ok(Logger::new(name, level, registry))
        })
    }
}
