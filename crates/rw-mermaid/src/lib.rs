//! In-place Mermaid diagram rendering for RW document trees.
//!
//! This crate finds Mermaid code blocks in an [`rw_hast`] tree, renders them
//! in one batch and swaps each block for its rendered form:
//! - `<pre class="mermaid">` and `<code class="language-mermaid">` are diagram sources
//! - A `<pre>` holding nothing but a diagram `<code>` is replaced as a whole
//! - Four output strategies: raw `<pre class="mermaid">`, PNG `<img>`, SVG `<img>`, inline `<svg>`
//! - Failed diagrams go to an error fallback, or are reported on the [`SourceFile`]
//!
//! # Architecture
//!
//! - [`classify`](is_diagram_element): tag and class-token matching
//! - [`collect`]: single depth-first walk producing ordered [`DiagramInstance`]s
//! - [`MermaidTransformer`]: strategy dispatch, batch render, result mapping
//! - [`BatchRenderer`]: renderer contract; [`KrokiRenderer`] renders via a Kroki server

mod classify;
mod collect;
mod consts;
mod error;
mod file;
mod kroki;
mod render;
mod replace;
mod splice;
mod strategy;
mod svg;
mod transform;

pub use classify::is_diagram_element;
pub use collect::{DiagramInstance, TreePath, collect};
pub use consts::{CODE_CLASS, DEFAULT_PREFIX, DEFAULT_TIMEOUT, PRE_CLASS, SOURCE};
pub use error::{Error, RenderError};
pub use file::{Message, SourceFile};
pub use kroki::{KrokiRenderer, create_agent};
pub use render::{BatchRenderer, RenderOptions, RenderOutcome, RenderedDiagram};
pub use replace::{build_replacement, pre_block};
pub use strategy::Strategy;
pub use svg::{SvgMetadata, png_dimensions, rename_root_id};
pub use transform::{ErrorFallback, MermaidTransformer};
