//! Kroki batch renderer with parallel HTTP requests.
//!
//! Each diagram is posted to `{url}/mermaid/svg` (plus `{url}/mermaid/png`
//! when a screenshot is requested). The batch fans out over the rayon global
//! pool; outcomes keep submission order and a failing diagram only fails
//! itself.

use std::fmt;
use std::time::Duration;

use rayon::prelude::*;
use ureq::Agent;

use crate::consts::{DEFAULT_TIMEOUT, KROKI_ENDPOINT};
use crate::error::RenderError;
use crate::render::{BatchRenderer, RenderOptions, RenderOutcome, RenderedDiagram};
use crate::svg::{SvgMetadata, png_dimensions, rename_root_id};

/// Header prefix Kroki reads diagram options from.
const OPTION_HEADER_PREFIX: &str = "Kroki-Diagram-Options-";

/// Create HTTP agent with the specified timeout.
///
/// Status codes are not turned into errors so the error body can be reported.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Renders Mermaid diagrams through a Kroki server.
#[derive(Clone)]
pub struct KrokiRenderer {
    url: String,
    agent: Agent,
}

impl fmt::Debug for KrokiRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KrokiRenderer").field("url", &self.url).finish_non_exhaustive()
    }
}

impl KrokiRenderer {
    /// Renderer for the server at `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_owned();
        Self {
            url,
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Replace the HTTP timeout applied to each request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a diagram to Kroki and return the response body as bytes.
    ///
    /// Handles HTTP errors by reading the response body for error details.
    fn send_diagram_request(
        &self,
        source: &str,
        format: &str,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let url = format!("{}/{KROKI_ENDPOINT}/{format}", self.url);

        let mut request = self.agent.post(&url).header("Content-Type", "text/plain");
        for (name, value) in &options.engine {
            request = request.header(option_header(name), value);
        }

        let response = request
            .send(source.as_bytes())
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderError::Http(format!("HTTP {status}: {}", error_body.trim())));
        }

        body.read_to_vec().map_err(|e| RenderError::Io(e.to_string()))
    }

    /// Render one diagram: SVG always, PNG on request.
    fn render_one(&self, index: usize, source: &str, options: &RenderOptions) -> RenderOutcome {
        let data = self.send_diagram_request(source, "svg", options)?;
        let svg = String::from_utf8(data)
            .map_err(|e| RenderError::Io(format!("invalid UTF-8 in SVG: {e}")))?;
        let svg = svg.trim().to_owned();

        let mut meta = SvgMetadata::extract(&svg)?;
        let svg = match &options.prefix {
            Some(prefix) => {
                let id = format!("{prefix}-{index}");
                let svg = rename_root_id(&svg, meta.id.as_deref(), &id)?;
                meta.id = Some(id);
                svg
            }
            None => svg,
        };

        let screenshot = if options.screenshot {
            let data = self.send_diagram_request(source, "png", options)?;
            let (width, height) = png_dimensions(&data).ok_or(RenderError::InvalidPng)?;
            meta.width.get_or_insert(f64::from(width));
            meta.height.get_or_insert(f64::from(height));
            Some(data)
        } else {
            None
        };

        Ok(RenderedDiagram {
            svg,
            screenshot,
            id: meta.id,
            title: meta.title,
            description: meta.description,
            width: meta.width.unwrap_or_default(),
            height: meta.height.unwrap_or_default(),
        })
    }
}

impl BatchRenderer for KrokiRenderer {
    fn render(&self, diagrams: &[String], options: &RenderOptions) -> Vec<RenderOutcome> {
        if diagrams.is_empty() {
            return Vec::new();
        }

        tracing::info!(
            count = diagrams.len(),
            url = %self.url,
            "Rendering mermaid diagrams via Kroki"
        );

        let outcomes: Vec<RenderOutcome> = diagrams
            .par_iter()
            .enumerate()
            .map(|(index, source)| self.render_one(index, source, options))
            .collect();

        for (index, outcome) in outcomes.iter().enumerate() {
            if let Err(error) = outcome {
                tracing::warn!(index, %error, "Kroki failed to render diagram");
            }
        }
        outcomes
    }
}

/// Header name carrying the engine option `name`.
fn option_header(name: &str) -> String {
    format!("{OPTION_HEADER_PREFIX}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trailing_slash_trimmed() {
        assert_eq!(KrokiRenderer::new("https://kroki.io/").url(), "https://kroki.io");
        assert_eq!(KrokiRenderer::new("http://localhost:8000").url(), "http://localhost:8000");
    }

    #[test]
    fn test_option_header() {
        assert_eq!(option_header("theme"), "Kroki-Diagram-Options-theme");
    }

    #[test]
    fn test_empty_batch_sends_nothing() {
        let renderer = KrokiRenderer::new("http://127.0.0.1:9").timeout(Duration::from_millis(10));

        assert!(renderer.render(&[], &RenderOptions::default()).is_empty());
    }

    #[test]
    fn test_unreachable_server_fails_each_diagram() {
        let renderer = KrokiRenderer::new("http://127.0.0.1:9").timeout(Duration::from_secs(2));
        let diagrams = vec!["graph TD\n  A --> B".to_owned(), "graph LR\n  C".to_owned()];

        let outcomes = renderer.render(&diagrams, &RenderOptions::default());

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| matches!(o, Err(RenderError::Http(_)))));
    }
}
