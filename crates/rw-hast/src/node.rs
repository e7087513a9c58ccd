//! Document tree types.

use std::collections::BTreeMap;

use crate::class::ClassList;

/// Element attributes keyed by attribute name.
///
/// Ordered so that serialization is deterministic.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Raw string value, as written in markup.
    String(String),
    /// Already tokenized value (e.g. a class list built by a transformer).
    List(Vec<String>),
    /// Numeric value (e.g. image dimensions).
    Number(f64),
    /// Boolean attribute; `false` is omitted on serialization.
    Boolean(bool),
}

impl PropertyValue {
    /// String value, if this is a [`PropertyValue::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// One place in the source markup (1-based line and column, 0-based byte offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// Source span of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

/// Root of a document or fragment. Has children but no tag or attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Root {
    pub children: Vec<Node>,
}

impl Root {
    #[must_use]
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// First element child, skipping text and comments.
    #[must_use]
    pub fn first_element(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }

    /// Take ownership of the first element child.
    #[must_use]
    pub fn into_first_element(self) -> Option<Element> {
        self.children.into_iter().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }
}

/// Any node that can appear in a children list.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Text {
            value: value.into(),
            position: None,
        })
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is a text node made only of HTML inter-element
    /// whitespace (space, tab, LF, FF, CR) or empty.
    #[must_use]
    pub fn is_whitespace_text(&self) -> bool {
        self.as_text()
            .is_some_and(|text| text.value.chars().all(|c| c.is_ascii_whitespace()))
    }

    /// Children of this node (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(element) => &element.children,
            _ => &[],
        }
    }

    fn push_text_content(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&text.value),
            Self::Element(element) => {
                for child in &element.children {
                    child.push_text_content(out);
                }
            }
            Self::Comment(_) => {}
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

/// Element node: tag name, attributes and ordered children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag_name: String,
    pub properties: Properties,
    pub children: Vec<Node>,
    pub position: Option<Position>,
}

impl Element {
    /// Create an element without attributes or children.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Whether the element has the given tag name.
    #[must_use]
    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Normalized class tokens of the `class` attribute.
    #[must_use]
    pub fn class_list(&self) -> ClassList {
        ClassList::from_property(self.property("class"))
    }

    /// Concatenated text of all descendant text nodes, whitespace preserved.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_text_content(&mut out);
        }
        out
    }
}

/// Text leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
    pub position: Option<Position>,
}

/// Comment leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_preserves_whitespace() {
        let code = Element::new("code")
            .with_child(Node::text("graph TD\n  A --> B"))
            .with_child(Element::new("span").with_child(Node::text("\n\n  B --> C\n")));

        assert_eq!(code.text_content(), "graph TD\n  A --> B\n\n  B --> C\n");
    }

    #[test]
    fn test_text_content_skips_comments() {
        let code = Element::new("code")
            .with_child(Node::Comment(Comment {
                value: "ignored".to_owned(),
            }))
            .with_child(Node::text("A"));

        assert_eq!(code.text_content(), "A");
    }

    #[test]
    fn test_is_whitespace_text() {
        assert!(Node::text(" \n\t").is_whitespace_text());
        assert!(Node::text("").is_whitespace_text());
        assert!(!Node::text(" x ").is_whitespace_text());
        assert!(!Node::text("\u{a0}").is_whitespace_text());
        assert!(!Node::text("\n\u{2028}").is_whitespace_text());
        assert!(!Node::from(Element::new("br")).is_whitespace_text());
    }

    #[test]
    fn test_first_element_skips_leaves() {
        let root = Root::new(vec![
            Node::text("\n"),
            Node::Comment(Comment {
                value: "c".to_owned(),
            }),
            Element::new("svg").into(),
            Element::new("p").into(),
        ]);

        assert_eq!(root.first_element().map(|e| e.tag_name.as_str()), Some("svg"));
        assert_eq!(root.into_first_element().map(|e| e.tag_name), Some("svg".to_owned()));
    }

    #[test]
    fn test_property_builders() {
        let img = Element::new("img")
            .with_property("alt", "")
            .with_property("width", 100.0)
            .with_property("hidden", true);

        assert!(img.is("img"));
        assert_eq!(img.property("alt").and_then(PropertyValue::as_str), Some(""));
        assert_eq!(img.property("width"), Some(&PropertyValue::Number(100.0)));
        assert_eq!(img.property("hidden"), Some(&PropertyValue::Boolean(true)));
        assert!(img.property("src").is_none());
    }
}
