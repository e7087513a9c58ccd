//! HTML serializer.

use std::fmt::Write;

use crate::node::{Element, Node, PropertyValue, Root};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text is written unescaped (outside SVG).
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize a tree to HTML.
#[must_use]
pub fn to_html(root: &Root) -> String {
    let mut out = String::with_capacity(4096);
    for child in &root.children {
        serialize_node(child, false, false, &mut out);
    }
    out
}

/// Serialize a single element (and its subtree) to HTML.
#[must_use]
pub fn element_to_html(element: &Element) -> String {
    let mut out = String::new();
    serialize_element(element, false, &mut out);
    out
}

fn serialize_node(node: &Node, in_svg: bool, raw_text: bool, out: &mut String) {
    match node {
        Node::Element(element) => serialize_element(element, in_svg, out),
        Node::Text(text) if raw_text => out.push_str(&text.value),
        Node::Text(text) => out.push_str(&escape_html(&text.value)),
        Node::Comment(comment) => {
            let _ = write!(out, "<!--{}-->", comment.value);
        }
    }
}

fn serialize_element(element: &Element, in_svg: bool, out: &mut String) {
    let in_svg = in_svg || element.is("svg");

    out.push('<');
    out.push_str(&element.tag_name);

    for (name, value) in &element.properties {
        match value {
            PropertyValue::String(s) => {
                let _ = write!(out, r#" {name}="{}""#, escape_html(s));
            }
            PropertyValue::List(tokens) => {
                let _ = write!(out, r#" {name}="{}""#, escape_html(&tokens.join(" ")));
            }
            PropertyValue::Number(n) => {
                let _ = write!(out, r#" {name}="{n}""#);
            }
            PropertyValue::Boolean(true) => {
                let _ = write!(out, " {name}");
            }
            PropertyValue::Boolean(false) => {}
        }
    }

    if !in_svg && VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
        out.push('>');
        return;
    }
    if in_svg && element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    let raw_text = !in_svg && RAW_TEXT_ELEMENTS.contains(&element.tag_name.as_str());
    // `foreignObject` content is HTML again.
    let children_in_svg = in_svg && !element.tag_name.eq_ignore_ascii_case("foreignObject");
    for child in &element.children {
        serialize_node(child, children_in_svg, raw_text, out);
    }
    let _ = write!(out, "</{}>", element.tag_name);
}

/// Escape `&`, `<`, `>` and `"` for text and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}
