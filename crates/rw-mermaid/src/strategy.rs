//! Output strategies for rendered diagrams.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How diagrams are written back into the tree.
///
/// Fixed for a whole transformation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Rewrite to `<pre class="mermaid">` with the raw source; nothing is rendered.
    PreMermaid,
    /// `<img>` with a base64 PNG data URI.
    ImgPng,
    /// `<img>` with an SVG data URI.
    ImgSvg,
    /// The rendered `<svg>` element itself (default).
    #[default]
    InlineSvg,
}

impl Strategy {
    /// All strategies, in documentation order.
    pub const ALL: [Self; 4] = [Self::PreMermaid, Self::ImgPng, Self::ImgSvg, Self::InlineSvg];

    /// Parse a strategy name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre-mermaid" => Some(Self::PreMermaid),
            "img-png" => Some(Self::ImgPng),
            "img-svg" => Some(Self::ImgSvg),
            "inline-svg" => Some(Self::InlineSvg),
            _ => None,
        }
    }

    /// Return strategy as string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreMermaid => "pre-mermaid",
            Self::ImgPng => "img-png",
            Self::ImgSvg => "img-svg",
            Self::InlineSvg => "inline-svg",
        }
    }

    /// Whether the external renderer is called at all.
    #[must_use]
    pub fn needs_renderer(self) -> bool {
        self != Self::PreMermaid
    }

    /// Whether the renderer must produce a PNG screenshot.
    #[must_use]
    pub fn needs_screenshot(self) -> bool {
        self == Self::ImgPng
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::UnknownStrategy(s.to_owned()))
    }
}
