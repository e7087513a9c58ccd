//! `rw-mermaid render` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use pulldown_cmark::{Options, Parser, html};
use rw_hast::{parse_fragment, to_html};
use rw_mermaid::{Message, SourceFile};
use rw_mermaid_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// File extensions read as markdown.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// HTML (XHTML) or markdown file to transform.
    input: PathBuf,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mermaid.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output strategy: pre-mermaid, img-png, img-svg or inline-svg (overrides config).
    #[arg(long)]
    strategy: Option<String>,

    /// Kroki server URL (overrides config).
    #[arg(long, env = "KROKI_URL")]
    kroki_url: Option<String>,

    /// What to do with diagrams that fail: fail, remove or keep (overrides config).
    #[arg(long)]
    on_error: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            strategy: self.strategy.clone(),
            kroki_url: self.kroki_url.clone(),
            on_error: self.on_error.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if self.verbose {
            output.info(&format!(
                "Rendering {} ({})",
                self.input.display(),
                config.mermaid_resolved.strategy
            ));
        }

        let source = std::fs::read_to_string(&self.input)?;
        let markdown = is_markdown(&self.input);
        let markup = if markdown {
            markdown_to_html(&source)
        } else {
            source
        };

        let mut tree = parse_fragment(&markup).map_err(|source| CliError::Parse {
            path: self.input.display().to_string(),
            source,
        })?;
        let mut file = SourceFile::with_path(&self.input);

        let result = config.transformer().transform(&mut tree, &mut file);

        // Positions in markdown input point into generated HTML, not the source.
        for message in file.messages() {
            let line = format_message(&self.input, message, !markdown);
            if message.fatal {
                output.error(&line);
            } else {
                output.warning(&line);
            }
        }
        result?;

        let rendered = to_html(&tree);
        match &self.output {
            Some(path) => {
                std::fs::write(path, rendered)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Convert markdown to HTML; fenced `mermaid` blocks become
/// `<pre><code class="language-mermaid">`.
fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html, parser);
    html
}

fn format_message(path: &Path, message: &Message, located: bool) -> String {
    match &message.place {
        Some(place) if located => format!(
            "{}:{}:{}: {} [{}]",
            path.display(),
            place.start.line,
            place.start.column,
            message.reason,
            message.source
        ),
        _ => format!("{}: {} [{}]", path.display(), message.reason, message.source),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rw_hast::{Element, Point, Position};

    use super::*;

    fn args(dir: &Path, input: &str) -> RenderArgs {
        RenderArgs {
            input: dir.join(input),
            output: Some(dir.join("out.html")),
            config: Some(dir.join("mermaid.toml")),
            strategy: None,
            kroki_url: None,
            on_error: None,
            verbose: false,
        }
    }

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("docs/guide.md")));
        assert!(is_markdown(Path::new("README.Markdown")));
        assert!(!is_markdown(Path::new("page.html")));
        assert!(!is_markdown(Path::new("Makefile")));
    }

    #[test]
    fn test_markdown_fence_becomes_code_block() {
        let html = markdown_to_html("# Flow\n\n```mermaid\ngraph TD\n  A --> B\n```\n");

        assert_eq!(
            html,
            "<h1>Flow</h1>\n<pre><code class=\"language-mermaid\">graph TD\n  A --&gt; B\n</code></pre>\n"
        );
    }

    #[test]
    fn test_format_message() {
        let mut file = SourceFile::new();
        let mut pre = Element::new("pre");
        pre.position = Some(Position {
            start: Point { line: 4, column: 1, offset: 30 },
            end: Point { line: 6, column: 7, offset: 60 },
        });
        file.fail("HTTP error: HTTP 400: bad", &pre, "rw-mermaid");
        let message = &file.messages()[0];

        assert_eq!(
            format_message(Path::new("page.html"), message, true),
            "page.html:4:1: HTTP error: HTTP 400: bad [rw-mermaid]"
        );
        assert_eq!(
            format_message(Path::new("page.md"), message, false),
            "page.md: HTTP error: HTTP 400: bad [rw-mermaid]"
        );
    }

    #[test]
    fn test_render_markdown_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("mermaid.toml"),
            "[mermaid]\nstrategy = \"pre-mermaid\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("doc.md"),
            "Intro\n\n```mermaid\ngraph TD\n  A --> B\n```\n",
        )
        .unwrap();

        args(dir.path(), "doc.md").execute().unwrap();

        let written = std::fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert_eq!(
            written,
            "<p>Intro</p>\n<pre class=\"mermaid\">graph TD\n  A --&gt; B\n</pre>\n"
        );
    }

    #[test]
    fn test_render_html_strategy_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mermaid.toml"), "").unwrap();
        std::fs::write(
            dir.path().join("page.html"),
            r#"<div><code class="language-mermaid">graph LR</code></div>"#,
        )
        .unwrap();
        let mut args = args(dir.path(), "page.html");
        args.strategy = Some("pre-mermaid".to_owned());

        args.execute().unwrap();

        let written = std::fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert_eq!(written, r#"<div><pre class="mermaid">graph LR</pre></div>"#);
    }

    #[test]
    fn test_render_invalid_markup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mermaid.toml"), "").unwrap();
        std::fs::write(dir.path().join("page.html"), "<div><!-- unterminated comment</div>").unwrap();

        let err = args(dir.path(), "page.html").execute().unwrap_err();

        assert!(matches!(err, CliError::Parse { .. }));
        assert!(!dir.path().join("out.html").exists());
    }
}
