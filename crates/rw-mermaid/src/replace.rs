//! Replacement nodes for each output strategy.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rw_hast::{Element, Node, parse_fragment};

use crate::consts::PRE_CLASS;
use crate::error::RenderError;
use crate::render::RenderedDiagram;
use crate::strategy::Strategy;

/// Characters escaped in SVG data URIs: everything but `A-Za-z0-9-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `<pre class="mermaid">` holding the raw diagram text.
#[must_use]
pub fn pre_block(diagram: &str) -> Node {
    Element::new("pre")
        .with_property("class", vec![PRE_CLASS.to_owned()])
        .with_child(Node::text(diagram))
        .into()
}

/// Build the node that replaces `diagram` once rendered.
///
/// `pre-mermaid` ignores `rendered` and wraps the source in [`pre_block`].
pub fn build_replacement(
    strategy: Strategy,
    diagram: &str,
    rendered: &RenderedDiagram,
) -> Result<Node, RenderError> {
    match strategy {
        Strategy::PreMermaid => Ok(pre_block(diagram)),
        Strategy::ImgPng => {
            let png = rendered
                .screenshot
                .as_deref()
                .ok_or(RenderError::MissingScreenshot)?;
            let src = format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png));
            Ok(image(rendered, src))
        }
        Strategy::ImgSvg => {
            let src = format!(
                "data:image/svg+xml,{}",
                utf8_percent_encode(&rendered.svg, URI_COMPONENT)
            );
            Ok(image(rendered, src))
        }
        Strategy::InlineSvg => inline_svg(&rendered.svg),
    }
}

/// `<img>` carrying the rendered metadata.
fn image(rendered: &RenderedDiagram, src: String) -> Node {
    let mut img = Element::new("img")
        .with_property("alt", rendered.description.clone().unwrap_or_default())
        .with_property("height", rendered.height)
        .with_property("src", src)
        .with_property("width", rendered.width);
    if let Some(id) = &rendered.id {
        img = img.with_property("id", id.as_str());
    }
    if let Some(title) = &rendered.title {
        img = img.with_property("title", title.as_str());
    }
    img.into()
}

/// First element of the parsed SVG markup, attributes untouched.
fn inline_svg(svg: &str) -> Result<Node, RenderError> {
    let root = parse_fragment(svg).map_err(|e| RenderError::InvalidSvg(e.to_string()))?;
    root.into_first_element()
        .map(Node::from)
        .ok_or_else(|| RenderError::InvalidSvg("markup contains no element".to_owned()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rw_hast::{PropertyValue, element_to_html};

    use super::*;

    fn rendered() -> RenderedDiagram {
        RenderedDiagram {
            svg: r#"<svg id="mermaid-0" viewBox="0 0 80 40"><g/></svg>"#.to_owned(),
            screenshot: Some(vec![0x89, b'P', b'N', b'G']),
            id: Some("mermaid-0".to_owned()),
            title: Some("Flow".to_owned()),
            description: None,
            width: 80.0,
            height: 40.0,
        }
    }

    fn html(node: &Node) -> String {
        element_to_html(node.as_element().unwrap())
    }

    #[test]
    fn test_pre_block_keeps_text_verbatim() {
        let node = pre_block("graph TD\n    A -->  B\n\n");
        let pre = node.as_element().unwrap();

        assert_eq!(pre.property("class"), Some(&PropertyValue::List(vec!["mermaid".to_owned()])));
        assert_eq!(pre.children.len(), 1);
        assert_eq!(pre.text_content(), "graph TD\n    A -->  B\n\n");
    }

    #[test]
    fn test_pre_mermaid_replacement_uses_source() {
        let node = build_replacement(Strategy::PreMermaid, "graph LR", &rendered()).unwrap();

        assert_eq!(html(&node), r#"<pre class="mermaid">graph LR</pre>"#);
    }

    #[test]
    fn test_png_image() {
        let node = build_replacement(Strategy::ImgPng, "graph TD", &rendered()).unwrap();

        assert_eq!(
            html(&node),
            r#"<img alt="" height="40" id="mermaid-0" src="data:image/png;base64,iVBORw==" title="Flow" width="80">"#
        );
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_png_image_requires_screenshot() {
        let mut diagram = rendered();
        diagram.screenshot = None;

        assert_eq!(
            build_replacement(Strategy::ImgPng, "graph TD", &diagram),
            Err(RenderError::MissingScreenshot)
        );
    }

    #[test]
    fn test_svg_image_percent_encodes_markup() {
        let mut diagram = rendered();
        diagram.id = None;
        diagram.title = None;
        diagram.description = Some("A to B".to_owned());
        diagram.svg = r#"<svg a="1 #">(x)</svg>"#.to_owned();

        let node = build_replacement(Strategy::ImgSvg, "graph TD", &diagram).unwrap();
        let img = node.as_element().unwrap();

        assert_eq!(
            img.property("src").and_then(PropertyValue::as_str),
            Some("data:image/svg+xml,%3Csvg%20a%3D%221%20%23%22%3E(x)%3C%2Fsvg%3E")
        );
        assert_eq!(img.property("alt").and_then(PropertyValue::as_str), Some("A to B"));
        assert_eq!(img.property("id"), None);
        assert_eq!(img.property("title"), None);
    }

    #[test]
    fn test_inline_svg_uses_root_element() {
        let mut diagram = rendered();
        diagram.svg = concat!(
            r#"<?xml version="1.0"?>"#,
            "\n",
            r#"<svg id="mermaid-0" aria-roledescription="flowchart-v2" viewBox="0 0 80 40"><g/></svg>"#,
        )
        .to_owned();

        let node = build_replacement(Strategy::InlineSvg, "graph TD", &diagram).unwrap();

        assert_eq!(
            html(&node),
            r#"<svg aria-roledescription="flowchart-v2" id="mermaid-0" viewBox="0 0 80 40"><g/></svg>"#
        );
    }

    #[test]
    fn test_inline_svg_rejects_text_only_markup() {
        let mut diagram = rendered();
        diagram.svg = "Syntax error".to_owned();

        assert!(matches!(
            build_replacement(Strategy::InlineSvg, "graph TD", &diagram),
            Err(RenderError::InvalidSvg(_))
        ));
    }
}
