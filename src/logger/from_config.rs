//! Logger wiring from a loaded [`Config`].

use super::Logger;
use crate::Error;
use crate::config::Config;
use crate::internal;
use crate::registry::{Handle, Registry};

impl Registry {
    /// Logger named `name` with the sinks the config enables attached.
    ///
    /// Sinks are registered under the logger's name in their own kinds, so
    /// repeated calls reuse them. An existing logger keeps its level; the
    /// enabled sinks are attached if missing.
    ///
    /// # Errors
    /// `InvalidLevel` for a bad level in the config, unknown file mode or
    /// encoding names, and `Construction` when the file sink cannot open eagerly.
    pub fn logger_from_config(&self, name: &str, config: &Config) -> Result<Handle<Logger>, Error> {
        internal::debug("LOGGER", &format!("Building logger '{name}' from config"));
        let logger = self.bare_logger(name, config.level()?)?;
        let mut sinks: Vec<&str> = Vec::new();

        if config.stderr.enabled {
            let sink = self.stderr_sink(name, config.stderr_level()?)?;
            logger.attach(&sink);
            sinks.push("stderr");
        }

        if config.file.enabled {
            let target = config.file_target()?;
            let sink = self.file_sink(name, config.file_level()?, &target)?;
            internal::debug("LOGGER", &format!("File sink at {}", sink.path().display()));
            logger.attach(&sink);
            sinks.push("file");
        }

        if sinks.is_empty() {
            internal::warn("LOGGER", &format!("No sinks enabled for '{name}'"));
        } else {
            internal::debug("LOGGER", &format!("Sinks enabled: [{}]", sinks.join(", ")));
        }
        Ok(logger)
    }
}
