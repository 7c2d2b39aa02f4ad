//! Log line templates
//!
//! A template such as `"{level} {timestamp} {fileName} {context} {message}"`
//! is parsed once into segments. Rendering substitutes every placeholder;
//! a placeholder that renders empty also swallows one directly following
//! space so disabled components leave no double spaces behind.

use super::error::{LoggerError, Result};

/// Default line layout
pub const DEFAULT_LOG_FORMAT: &str = "{level} {timestamp} {fileName} {context} {message}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Level,
    Timestamp,
    FileName,
    Context,
    Message,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "level" => Some(Placeholder::Level),
            "timestamp" => Some(Placeholder::Timestamp),
            "fileName" => Some(Placeholder::FileName),
            "context" => Some(Placeholder::Context),
            "message" => Some(Placeholder::Message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// Rendered components of one line
#[derive(Debug, Default, Clone)]
pub struct Components<'a> {
    pub level: &'a str,
    pub timestamp: &'a str,
    pub file_name: &'a str,
    pub context: &'a str,
    pub message: &'a str,
}

impl Components<'_> {
    fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::Level => self.level,
            Placeholder::Timestamp => self.timestamp,
            Placeholder::FileName => self.file_name,
            Placeholder::Context => self.context,
            Placeholder::Message => self.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl LogTemplate {
    /// Parse a template; unknown `{names}` are kept as literal text
    ///
    /// # Errors
    ///
    /// Returns an error for an empty template.
    pub fn parse(source: &str) -> Result<Self> {
        if source.is_empty() {
            return Err(LoggerError::config("log_format", "template must not be empty"));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            match after_open.find('}') {
                Some(close) => match Placeholder::parse(&after_open[..close]) {
                    Some(placeholder) => {
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Field(placeholder));
                        rest = &after_open[close + 1..];
                    }
                    None => {
                        literal.push('{');
                        rest = after_open;
                    }
                },
                None => {
                    literal.push('{');
                    rest = after_open;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn contains(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|segment| *segment == Segment::Field(placeholder))
    }

    pub fn render(&self, components: &Components<'_>) -> String {
        let mut out = String::new();
        let mut skip_space = false;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    let text = if skip_space {
                        text.strip_prefix(' ').unwrap_or(text)
                    } else {
                        text
                    };
                    out.push_str(text);
                    skip_space = false;
                }
                Segment::Field(placeholder) => {
                    let value = components.get(*placeholder);
                    out.push_str(value);
                    skip_space = value.is_empty();
                }
            }
        }

        out
    }
}

impl Default for LogTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_LOG_FORMAT.to_string(),
            segments: vec![
                Segment::Field(Placeholder::Level),
                Segment::Literal(" ".into()),
                Segment::Field(Placeholder::Timestamp),
                Segment::Literal(" ".into()),
                Segment::Field(Placeholder::FileName),
                Segment::Literal(" ".into()),
                Segment::Field(Placeholder::Context),
                Segment::Literal(" ".into()),
                Segment::Field(Placeholder::Message),
            ],
        }
    }
}
