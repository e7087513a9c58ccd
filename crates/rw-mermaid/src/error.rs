//! Error types for Mermaid transformation.

/// Error returned by configuration and by [`MermaidTransformer::transform`](crate::MermaidTransformer::transform).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Strategy name not recognized.
    #[error("unknown strategy '{0}' (valid: pre-mermaid, img-png, img-svg, inline-svg)")]
    UnknownStrategy(String),

    /// Diagrams failed to render and no fallback handled them.
    ///
    /// Each failure is recorded as a fatal message on the [`SourceFile`](crate::SourceFile).
    #[error("{failed} of {total} mermaid diagram(s) failed to render")]
    Render {
        /// Number of diagrams reported as fatal.
        failed: usize,
        /// Number of diagrams submitted to the renderer.
        total: usize,
    },
}

/// Rendering error for a single diagram.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// HTTP request failed or the server returned an error status.
    #[error("HTTP error: {0}")]
    Http(String),
    /// Response body could not be read or decoded.
    #[error("I/O error: {0}")]
    Io(String),
    /// Screenshot bytes are not a PNG image.
    #[error("invalid PNG data")]
    InvalidPng,
    /// Rendered markup could not be used as SVG.
    #[error("invalid SVG: {0}")]
    InvalidSvg(String),
    /// A PNG was requested but the renderer returned none.
    #[error("renderer returned no screenshot")]
    MissingScreenshot,
    /// The renderer returned fewer outcomes than diagrams submitted.
    #[error("renderer returned no result for this diagram")]
    MissingResult,
    /// Error reported by the rendering engine itself.
    #[error("{0}")]
    Engine(String),
}
