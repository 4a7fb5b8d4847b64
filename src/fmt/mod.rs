//! Optional per-sink record layout.

mod format;

pub use format::{FormatSegment, FormatTemplate, Formatter, Placeholder};
