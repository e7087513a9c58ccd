//! Batch renderer contract.

use std::collections::BTreeMap;

use crate::consts::DEFAULT_PREFIX;
use crate::error::RenderError;

/// Options passed through to the renderer on every batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Produce a PNG screenshot next to the SVG.
    pub screenshot: bool,
    /// Prefix for rendered SVG root ids (`{prefix}-{index}`); `None` keeps engine ids.
    pub prefix: Option<String>,
    /// Engine options forwarded verbatim (Kroki diagram options).
    pub engine: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            screenshot: false,
            prefix: Some(DEFAULT_PREFIX.to_owned()),
            engine: BTreeMap::new(),
        }
    }
}

/// Successfully rendered diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDiagram {
    /// SVG markup.
    pub svg: String,
    /// PNG bytes, present when a screenshot was requested.
    pub screenshot: Option<Vec<u8>>,
    /// Id of the SVG root element.
    pub id: Option<String>,
    /// Accessible title of the diagram.
    pub title: Option<String>,
    /// Accessible description of the diagram.
    pub description: Option<String>,
    pub width: f64,
    pub height: f64,
}

impl RenderedDiagram {
    /// Diagram with only SVG markup and dimensions.
    #[must_use]
    pub fn new(svg: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            svg: svg.into(),
            screenshot: None,
            id: None,
            title: None,
            description: None,
            width,
            height,
        }
    }
}

/// Outcome for one submitted diagram.
pub type RenderOutcome = Result<RenderedDiagram, RenderError>;

/// Renders a batch of diagrams in one call.
///
/// Implementations must return one outcome per submitted diagram, in
/// submission order. A failing diagram must not fail the others.
pub trait BatchRenderer: Send + Sync {
    fn render(&self, diagrams: &[String], options: &RenderOptions) -> Vec<RenderOutcome>;
}

impl<F> BatchRenderer for F
where
    F: Fn(&[String], &RenderOptions) -> Vec<RenderOutcome> + Send + Sync,
{
    fn render(&self, diagrams: &[String], options: &RenderOptions) -> Vec<RenderOutcome> {
        self(diagrams, options)
    }
}
