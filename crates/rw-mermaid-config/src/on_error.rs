//! What to do with diagrams that fail to render.

use std::fmt;

use rw_hast::Node;
use rw_mermaid::{MermaidTransformer, SOURCE};

/// Error handling policy for failed diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnError {
    /// Report a fatal diagnostic and fail the run (no fallback).
    #[default]
    Fail,
    /// Drop the diagram from the output, with a warning.
    Remove,
    /// Leave the original source block in place, with a warning.
    Keep,
}

impl OnError {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fail" => Some(Self::Fail),
            "remove" => Some(Self::Remove),
            "keep" => Some(Self::Keep),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Remove => "remove",
            Self::Keep => "keep",
        }
    }

    /// Install the matching error fallback on `transformer`.
    #[must_use]
    pub fn apply(self, transformer: MermaidTransformer) -> MermaidTransformer {
        match self {
            Self::Fail => transformer,
            Self::Remove => transformer.with_error_fallback(|element, _, error, file| {
                file.message(format!("Removed mermaid diagram: {error}"), element, SOURCE);
                None
            }),
            Self::Keep => transformer.with_error_fallback(|element, _, error, file| {
                file.message(format!("Kept mermaid source: {error}"), element, SOURCE);
                Some(Node::from(element.clone()))
            }),
        }
    }
}

impl fmt::Display for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
