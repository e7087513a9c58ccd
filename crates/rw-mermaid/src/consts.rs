//! Internal constants for Mermaid rendering.

use std::time::Duration;

/// Class token marking a `<pre>` as a ready-to-render Mermaid block.
pub const PRE_CLASS: &str = "mermaid";

/// Class token marking a `<code>` as Mermaid source.
pub const CODE_CLASS: &str = "language-mermaid";

/// Source tag attached to diagnostics.
pub const SOURCE: &str = "rw-mermaid";

/// Default id prefix for rendered SVG roots.
pub const DEFAULT_PREFIX: &str = "mermaid";

/// Kroki endpoint for Mermaid diagrams.
pub const KROKI_ENDPOINT: &str = "mermaid";

/// Default HTTP timeout for Kroki requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
