//! logbytes' own diagnostic logger.
//!
//! Built from the crate's own parts: a `Logger` with one `StdErrSink`, held in
//! a private `Registry` so it never shows up in callers' registries. `OnceLock`
//! makes the first `init` win; calls made before `init` silently vanish.
//!
//! Diagnostics are emitted outside registry locks, and the stderr path never
//! logs, so this cannot recurse into itself.

use crate::Error;
use crate::fmt::Formatter;
use crate::level::{Level, LevelSpec, normalize};
use crate::logger::Logger;
use crate::registry::{Handle, Registry};
use crate::sink::Sink;
use std::sync::OnceLock;

const NAME: &str = "logbytes";

struct Internal {
    // Keeps the sink and logger registered for the life of the process.
    _registry: Registry,
    logger: Handle<Logger>,
}

static INTERNAL_LOGGER: OnceLock<Internal> = OnceLock::new();

/// Installs the diagnostic logger at `level`. Later calls are no-ops.
///
/// # Errors
/// `InvalidLevel` if `level` does not normalize.
pub fn init(level: impl Into<LevelSpec>) -> Result<(), Error> {
    let level = normalize(level)?;
    let was_init = INTERNAL_LOGGER.get().is_some();
    if !was_init {
        let internal = build_internal_logger(level)?;
        let _ = INTERNAL_LOGGER.set(internal);
        debug("INTERNAL", &format!("Internal logger ready at {level}"));
    }
    Ok(())
}

fn build_internal_logger(level: Level) -> Result<Internal, Error> {
    let registry = Registry::new();
    let logger = registry.bare_logger(NAME, level)?;
    let sink = registry.stderr_sink(NAME, Level::NOTSET)?;
    sink.core().set_formatter(Some(Formatter::new(
        "{timestamp} [{level}] logbytes: {msg}",
    )));
    logger.attach(&sink);
    Ok(Internal {
        _registry: registry,
        logger,
    })
}

/// Pre-init calls silently vanish rather than failing.
fn log(level: Level, scope: &str, msg: &str) {
    if let Some(internal) = INTERNAL_LOGGER.get() {
        let _ = internal.logger.emit(level, &format!("{scope}: {msg}"));
    }
}

/// Visible only below DEBUG, for high-volume instrumentation.
pub fn trace(scope: &str, msg: &str) {
    log(Level::from_ordinal(5), scope, msg);
}

pub fn debug(scope: &str, msg: &str) {
    log(Level::DEBUG, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Level::INFO, scope, msg);
}

pub fn warn(scope: &str, msg: &str) {
    log(Level::WARNING, scope, msg);
}

pub fn error(scope: &str, msg: &str) {
    log(Level::ERROR, scope, msg);
}
