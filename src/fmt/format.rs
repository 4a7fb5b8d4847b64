//! Record templates like `{timestamp} [{level}] {name}: {msg}`.
//!
//! A sink without a formatter writes the bare message; attaching a
//! [`Formatter`] lets each sink choose its own line layout.

use crate::Error;
use crate::sink::LogRecord;
use chrono::format::{Item, StrftimeItems};

/// Closed set of known substitution tokens. Unknown `{names}` pass through as literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Timestamp,
    Level,
    LevelNo,
    Name,
    Msg,
}

impl Placeholder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Level => "level",
            Self::LevelNo => "levelno",
            Self::Name => "name",
            Self::Msg => "msg",
        }
    }

    pub const ALL: &'static [Self] = &[
        Self::Timestamp,
        Self::Level,
        Self::LevelNo,
        Self::Name,
        Self::Msg,
    ];
}

/// Parsed once, rendered per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Pre-parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    segments: Vec<FormatSegment>,
}

impl FormatTemplate {
    /// Turns `"{level} {msg}"` into a segment list.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|c| open + c) else {
                break;
            };
            current.push_str(&rest[..open]);
            let name = &rest[open + 1..close];

            if let Some(ph) = Placeholder::ALL.iter().find(|ph| ph.as_str() == name) {
                if !current.is_empty() {
                    segments.push(FormatSegment::Literal(std::mem::take(&mut current)));
                }
                segments.push(FormatSegment::Placeholder(*ph));
            } else {
                current.push_str(&rest[open..=close]);
            }
            rest = &rest[close + 1..];
        }
        current.push_str(rest);

        if !current.is_empty() {
            segments.push(FormatSegment::Literal(current));
        }

        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[FormatSegment] {
        &self.segments
    }

    /// Substitutes record fields into the template.
    #[must_use]
    pub fn render(&self, record: &LogRecord, timestamp_format: &str) -> String {
        let mut result = String::new();

        for segment in &self.segments {
            match segment {
                FormatSegment::Literal(s) => result.push_str(s),
                FormatSegment::Placeholder(Placeholder::Timestamp) => {
                    result.push_str(&record.created.format(timestamp_format).to_string());
                }
                FormatSegment::Placeholder(Placeholder::Level) => {
                    result.push_str(&record.level.to_string());
                }
                FormatSegment::Placeholder(Placeholder::LevelNo) => {
                    result.push_str(&record.level.ordinal().to_string());
                }
                FormatSegment::Placeholder(Placeholder::Name) => result.push_str(&record.name),
                FormatSegment::Placeholder(Placeholder::Msg) => result.push_str(&record.message),
            }
        }

        result
    }
}

impl Default for FormatTemplate {
    fn default() -> Self {
        Self::parse("{msg}")
    }
}

/// Template plus the strftime pattern used for `{timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    template: FormatTemplate,
    timestamp_format: String,
}

impl Formatter {
    #[must_use]
    pub fn new(template: &str) -> Self {
        Self {
            template: FormatTemplate::parse(template),
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }

    /// Replaces the strftime pattern used for `{timestamp}`.
    ///
    /// # Errors
    /// `InvalidFormat` if chrono cannot parse the pattern; rendering it
    /// later would otherwise fail mid-emit.
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Result<Self, Error> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidFormat(format));
        }
        self.timestamp_format = format;
        Ok(self)
    }

    #[must_use]
    pub const fn template(&self) -> &FormatTemplate {
        &self.template
    }

    #[must_use]
    pub fn format(&self, record: &LogRecord) -> String {
        self.template.render(record, &self.timestamp_format)
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new("{msg}")
    }
}
