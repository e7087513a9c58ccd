//! Diagnostics for the document being transformed.

use std::fmt;
use std::path::{Path, PathBuf};

use rw_hast::{Element, Position};

/// The document a tree came from, collecting messages raised while
/// transforming it.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    path: Option<PathBuf>,
    messages: Vec<Message>,
}

impl SourceFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Record a non-fatal message (warning) tied to `element`.
    pub fn message(&mut self, reason: impl fmt::Display, element: &Element, source: &str) {
        self.push(reason.to_string(), element, source, false);
    }

    /// Record a fatal message tied to `element`.
    pub fn fail(&mut self, reason: impl fmt::Display, element: &Element, source: &str) {
        self.push(reason.to_string(), element, source, true);
    }

    fn push(&mut self, reason: String, element: &Element, source: &str, fatal: bool) {
        let message = Message {
            reason,
            source: source.to_owned(),
            fatal,
            place: element.position,
            tag_name: element.tag_name.clone(),
        };
        tracing::debug!(path = ?self.path, fatal, %message, "Recorded message");
        self.messages.push(message);
    }

    /// Whether any fatal message was recorded.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.messages.iter().any(|message| message.fatal)
    }
}

/// A diagnostic raised against a [`SourceFile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub reason: String,
    /// Component that raised the message (`rw-mermaid`).
    pub source: String,
    pub fatal: bool,
    /// Location of the offending node in the input, when known.
    pub place: Option<Position>,
    /// Tag name of the offending node.
    pub tag_name: String,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(place) = &self.place {
            write!(f, "{}:{}: ", place.start.line, place.start.column)?;
        }
        write!(f, "{} [{}]", self.reason, self.source)
    }
}
