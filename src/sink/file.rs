//! File sink with open mode, text encoding and optional lazy opening.

use super::{Sink, SinkCore};
use crate::Error;
use crate::internal;
use crate::level::{Level, LevelSpec};
use crate::registry::{Handle, Kind, Registered, Registry};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the target file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    /// Create if missing, append to existing content.
    #[default]
    Append,
    /// Create if missing, truncate existing content when opened.
    Write,
    /// Append raw bytes with no text encoding applied.
    Binary,
}

impl FileMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Write => "write",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "append" | "a" => Ok(Self::Append),
            "write" | "w" => Ok(Self::Write),
            "binary" | "ab" | "b" => Ok(Self::Binary),
            _ => Err(Error::InvalidTarget(format!("unknown file mode '{s}'"))),
        }
    }
}

/// Text encodings a file sink can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
        }
    }

    fn encode(self, text: &str) -> Result<Cow<'_, [u8]>, Error> {
        match self {
            Self::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            Self::Latin1 => text
                .chars()
                .map(|ch| {
                    u8::try_from(u32::from(ch)).map_err(|_| Error::Encoding {
                        encoding: self.as_str(),
                        ch,
                    })
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(Cow::Owned),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            _ => Err(Error::InvalidTarget(format!("unsupported encoding '{s}'"))),
        }
    }
}

/// Where and how a file sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    path: PathBuf,
    base_dir: Option<PathBuf>,
    mode: FileMode,
    encoding: Option<Encoding>,
    delay: bool,
}

impl FileTarget {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base_dir: None,
            mode: FileMode::Append,
            encoding: None,
            delay: false,
        }
    }

    /// Directory that relative paths resolve against instead of the working directory.
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Ignored in binary mode. Text modes default to UTF-8.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Defer opening the file until the first emit.
    #[must_use]
    pub fn delay(mut self, delay: bool) -> Self {
        self.delay = delay;
        self
    }

    fn resolve(&self) -> io::Result<PathBuf> {
        let path = match &self.base_dir {
            Some(base) if self.path.is_relative() => base.join(&self.path),
            _ => self.path.clone(),
        };
        std::path::absolute(path)
    }
}

pub struct FileSink {
    core: SinkCore,
    path: PathBuf,
    mode: FileMode,
    encoding: Option<Encoding>,
    delay: bool,
    file: Mutex<Option<File>>,
}

impl FileSink {
    /// Resolves the path and, unless delayed, opens the file immediately.
    ///
    /// # Errors
    /// `Construction` if the path cannot be resolved or the eager open fails.
    pub fn new(name: &str, level: Level, target: &FileTarget) -> Result<Self, Error> {
        let construction = |source| Error::Construction {
            kind: Kind::FileSink,
            name: name.to_string(),
            source,
        };
        let path = target.resolve().map_err(construction)?;
        let encoding = match target.mode {
            FileMode::Binary => None,
            FileMode::Append | FileMode::Write => Some(target.encoding.unwrap_or_default()),
        };

        let sink = Self {
            core: SinkCore::new(Kind::FileSink, name, level),
            path,
            mode: target.mode,
            encoding,
            delay: target.delay,
            file: Mutex::new(None),
        };

        if !sink.delay {
            let file = sink.open().map_err(construction)?;
            *sink.file.lock() = Some(file);
        }
        Ok(sink)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn mode(&self) -> FileMode {
        self.mode
    }

    /// `None` in binary mode.
    #[must_use]
    pub const fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    #[must_use]
    pub const fn is_delayed(&self) -> bool {
        self.delay
    }

    /// True once the target file has been opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.file.lock().is_some()
    }

    fn open(&self) -> io::Result<File> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        match self.mode {
            FileMode::Write => options.write(true).truncate(true),
            FileMode::Append | FileMode::Binary => options.append(true),
        };
        options.open(&self.path)
    }
}

impl Registered for FileSink {
    const KIND: Kind = Kind::FileSink;
}

impl Sink for FileSink {
    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn write_line(&self, line: &str) -> Result<(), Error> {
        let bytes = match self.encoding {
            Some(encoding) => encoding.encode(line)?,
            None => Cow::Borrowed(line.as_bytes()),
        };

        let mut slot = self.file.lock();
        // close() takes the same lock, so this check cannot race a close.
        self.core.ensure_open()?;
        if slot.is_none() {
            // A failed lazy open is reported per emit and retried on the next one.
            let file = self.open().map_err(|source| Error::Construction {
                kind: Kind::FileSink,
                name: self.core.name().to_string(),
                source,
            })?;
            internal::debug(
                "FILE",
                &format!("Opened {} ({})", self.path.display(), self.mode),
            );
            *slot = Some(file);
        }
        if let Some(file) = slot.as_mut() {
            file.write_all(&bytes)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        if let Some(file) = self.file.lock().as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    fn close(&self) {
        let mut slot = self.file.lock();
        self.core.close();
        if let Some(mut file) = slot.take()
            && let Err(e) = file.flush()
        {
            internal::warn(
                "FILE",
                &format!("Flush on close failed for {}: {e}", self.path.display()),
            );
        }
    }
}

impl fmt::Debug for FileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSink")
            .field("name", &self.core.name())
            .field("level", &self.core.level())
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("encoding", &self.encoding)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// File sink registered under `name`. An existing sink is returned as-is,
    /// whatever `target` says.
    ///
    /// # Errors
    /// `InvalidLevel` for an unnormalizable level, `Construction` when an eager
    /// open fails. Nothing is registered on error.
    pub fn file_sink(
        &self,
        name: &str,
        level: impl Into<LevelSpec>,
        target: &FileTarget,
    ) -> Result<Handle<FileSink>, Error> {
        self.get_or_create(name, level, |name, level| FileSink::new(name, level, target))
    }
}
