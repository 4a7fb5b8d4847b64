//! Process console: the single place that writes already-formatted text to
//! stdout or stderr.
//!
//! Message styling lives outside this crate; its only contract with us is
//! [`emit`]. Either stream can be redirected at runtime (tests capture
//! output this way). Writers read the redirection at write time, so a
//! redirect installed after a sink was built still applies to it.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Writer that can be installed as a console redirection target.
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

static STDOUT_REDIRECT: Mutex<Option<SharedWriter>> = Mutex::new(None);
static STDERR_REDIRECT: Mutex<Option<SharedWriter>> = Mutex::new(None);

/// Writes `text` as-is to stderr when `to_stderr` is set, else to stdout.
///
/// # Errors
/// I/O errors from the underlying stream.
pub fn emit(text: &str, to_stderr: bool) -> io::Result<()> {
    if to_stderr {
        write_stderr(text.as_bytes())
    } else {
        write_stdout(text.as_bytes())
    }
}

/// Replaces the stderr target, returning the previous redirection. `None` restores the real stream.
pub fn redirect_stderr(writer: Option<SharedWriter>) -> Option<SharedWriter> {
    std::mem::replace(&mut *STDERR_REDIRECT.lock(), writer)
}

/// Replaces the stdout target, returning the previous redirection. `None` restores the real stream.
pub fn redirect_stdout(writer: Option<SharedWriter>) -> Option<SharedWriter> {
    std::mem::replace(&mut *STDOUT_REDIRECT.lock(), writer)
}

pub(crate) fn write_stderr(bytes: &[u8]) -> io::Result<()> {
    // Clone out of the static so the redirect lock is not held across the write.
    let redirect = STDERR_REDIRECT.lock().clone();
    match redirect {
        Some(writer) => writer.lock().write_all(bytes),
        None => io::stderr().lock().write_all(bytes),
    }
}

pub(crate) fn write_stdout(bytes: &[u8]) -> io::Result<()> {
    let redirect = STDOUT_REDIRECT.lock().clone();
    match redirect {
        Some(writer) => writer.lock().write_all(bytes),
        None => io::stdout().lock().write_all(bytes),
    }
}

pub(crate) fn flush_stderr() -> io::Result<()> {
    let redirect = STDERR_REDIRECT.lock().clone();
    match redirect {
        Some(writer) => writer.lock().flush(),
        None => io::stderr().flush(),
    }
}

pub(crate) fn flush_stdout() -> io::Result<()> {
    let redirect = STDOUT_REDIRECT.lock().clone();
    match redirect {
        Some(writer) => writer.lock().flush(),
        None => io::stdout().flush(),
    }
}
