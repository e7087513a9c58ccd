//! Mermaid tree transformer.
//!
//! One run collects every diagram, renders the whole batch with a single
//! renderer call and splices the results back in document order.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rw_hast::{parse_fragment, to_html};
//! use rw_mermaid::{MermaidTransformer, SourceFile, Strategy};
//!
//! let renderer = Arc::new(rw_mermaid::KrokiRenderer::new("https://kroki.io"));
//! let transformer = MermaidTransformer::new(renderer).with_strategy(Strategy::PreMermaid);
//!
//! let mut tree =
//!     parse_fragment(r#"<pre><code class="language-mermaid">graph TD</code></pre>"#).unwrap();
//! transformer.transform(&mut tree, &mut SourceFile::new()).unwrap();
//!
//! assert_eq!(to_html(&tree), r#"<pre class="mermaid">graph TD</pre>"#);
//! ```

use std::sync::Arc;

use rw_hast::{Element, Node, Root};

use crate::collect::collect;
use crate::consts::SOURCE;
use crate::error::{Error, RenderError};
use crate::file::SourceFile;
use crate::render::{BatchRenderer, RenderOptions};
use crate::replace::{build_replacement, pre_block};
use crate::splice::Splicer;
use crate::strategy::Strategy;

/// Callback deciding what replaces a diagram that failed to render.
///
/// Receives the node to replace, the diagram source, the error and the file,
/// which it may record messages on. `Some(node)` replaces the diagram,
/// `None` removes it.
pub type ErrorFallback =
    Box<dyn Fn(&Element, &str, &RenderError, &mut SourceFile) -> Option<Node> + Send + Sync>;

/// Replaces Mermaid code blocks in a tree with rendered diagrams.
pub struct MermaidTransformer {
    renderer: Arc<dyn BatchRenderer>,
    strategy: Strategy,
    render_options: RenderOptions,
    error_fallback: Option<ErrorFallback>,
}

impl MermaidTransformer {
    /// Create a transformer with the default strategy and no error fallback.
    #[must_use]
    pub fn new(renderer: Arc<dyn BatchRenderer>) -> Self {
        Self {
            renderer,
            strategy: Strategy::default(),
            render_options: RenderOptions::default(),
            error_fallback: None,
        }
    }

    /// Set the output strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set options forwarded to the renderer.
    ///
    /// The screenshot flag is always derived from the strategy.
    #[must_use]
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Set the callback used for diagrams that fail to render.
    #[must_use]
    pub fn with_error_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&Element, &str, &RenderError, &mut SourceFile) -> Option<Node>
            + Send
            + Sync
            + 'static,
    {
        self.error_fallback = Some(Box::new(fallback));
        self
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Transform `tree` in place.
    ///
    /// Failures without a fallback are recorded as fatal messages on `file`;
    /// every other diagram is still processed before [`Error::Render`] is
    /// returned.
    pub fn transform(&self, tree: &mut Root, file: &mut SourceFile) -> Result<(), Error> {
        let instances = collect(tree, self.strategy);
        if instances.is_empty() {
            tracing::debug!(path = ?file.path(), "No mermaid diagrams found");
            return Ok(());
        }

        let mut splicer = Splicer::default();

        if !self.strategy.needs_renderer() {
            for instance in &instances {
                let block = pre_block(&instance.diagram);
                if !splicer.splice(tree, &instance.path, Some(block)) {
                    tracing::debug!(path = ?instance.path, "Skipping detached mermaid node");
                }
            }
            tracing::debug!(count = instances.len(), "Rewrote mermaid diagrams as pre blocks");
            return Ok(());
        }

        let diagrams: Vec<String> = instances.iter().map(|i| i.diagram.clone()).collect();
        let options = RenderOptions {
            screenshot: self.strategy.needs_screenshot(),
            ..self.render_options.clone()
        };

        tracing::info!(
            count = diagrams.len(),
            strategy = %self.strategy,
            "Rendering mermaid diagrams"
        );
        let outcomes = self.renderer.render(&diagrams, &options);
        if outcomes.len() != diagrams.len() {
            tracing::warn!(
                expected = diagrams.len(),
                actual = outcomes.len(),
                "Renderer returned wrong number of results"
            );
        }
        let mut outcomes = outcomes.into_iter();

        let mut failed = 0;
        for instance in &instances {
            let outcome = outcomes.next().unwrap_or(Err(RenderError::MissingResult));
            let replacement = match outcome.and_then(|rendered| {
                build_replacement(self.strategy, &instance.diagram, &rendered)
            }) {
                Ok(node) => Some(node),
                Err(error) => {
                    let Some(node) = splicer.resolve(tree, &instance.path) else {
                        tracing::debug!(path = ?instance.path, "Skipping detached mermaid node");
                        continue;
                    };
                    let Some(fallback) = &self.error_fallback else {
                        file.fail(&error, node, SOURCE);
                        failed += 1;
                        continue;
                    };
                    tracing::warn!(%error, "Mermaid diagram failed, using fallback");
                    fallback(node, &instance.diagram, &error, file)
                }
            };

            if !splicer.splice(tree, &instance.path, replacement) {
                tracing::debug!(path = ?instance.path, "Skipping detached mermaid node");
            }
        }

        tracing::info!(total = diagrams.len(), failed, "Finished rendering mermaid diagrams");

        if failed > 0 {
            return Err(Error::Render {
                failed,
                total: diagrams.len(),
            });
        }
        Ok(())
    }
}
