//! XHTML fragment parser.
//!
//! Parses well-formed markup (rendered SVG, XHTML-style HTML such as
//! `pulldown-cmark` output) into a [`Root`]. HTML void elements are accepted
//! without a closing slash, entity references are decoded and every element
//! and text node carries its source [`Position`].

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{decode_entity, decode_references};
use crate::node::{Comment, Element, Node, Point, Position, PropertyValue, Root, Text};

/// Wrapper element that turns a fragment into a single XML document.
const WRAPPER_TAG: &str = "rw-fragment";

/// Elements that never have children in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Error while parsing a fragment.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// XML syntax error.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Encoding error while decoding names or text.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}

/// Parse a markup fragment into a tree.
///
/// Comments are kept, declarations, processing instructions and doctypes
/// are dropped. Mismatched end tags are ignored.
///
/// # Errors
///
/// Returns an error if the markup is not well-formed enough for `quick-xml`.
pub fn parse_fragment(markup: &str) -> Result<Root, ParseError> {
    let wrapped = format!("<{WRAPPER_TAG}>{markup}</{WRAPPER_TAG}>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let parser = FragmentParser::new(markup);

    // Skip up to and including the wrapper start tag.
    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf)?;
        if matches!(event, Event::Start(_) | Event::Eof) {
            break;
        }
        buf.clear();
    }

    let (children, _) = parser.parse_children(&mut reader, None)?;
    Ok(Root { children })
}

/// Maps reader offsets back to line/column in the original fragment.
struct FragmentParser {
    line_starts: Vec<usize>,
    len: usize,
}

impl FragmentParser {
    fn new(markup: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(markup.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            line_starts,
            len: markup.len(),
        }
    }

    /// Convert a reader position (inside the wrapped document) to a [`Point`].
    fn point(&self, reader_offset: u64) -> Point {
        let offset = usize::try_from(reader_offset)
            .unwrap_or(usize::MAX)
            .saturating_sub(WRAPPER_TAG.len() + 2)
            .min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts.get(line - 1).copied().unwrap_or(0);
        Point {
            line,
            column: offset - line_start + 1,
            offset,
        }
    }

    fn position(&self, start: u64, end: u64) -> Option<Position> {
        Some(Position {
            start: self.point(start),
            end: self.point(end),
        })
    }

    /// Parse children until the end tag of `parent_tag` (or the wrapper end).
    ///
    /// Returns the children and the reader position after the closing tag.
    fn parse_children<R: BufRead>(
        &self,
        reader: &mut Reader<R>,
        parent_tag: Option<&str>,
    ) -> Result<(Vec<Node>, u64), ParseError> {
        let mut buf = Vec::new();
        let mut children = Vec::new();

        loop {
            let start = reader.buffer_position();
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let mut element = Self::element(reader, &e)?;
                    let end = if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
                        reader.buffer_position()
                    } else {
                        let (nested, end) =
                            self.parse_children(reader, Some(element.tag_name.as_str()))?;
                        element.children = nested;
                        end
                    };
                    element.position = self.position(start, end);
                    children.push(Node::Element(element));
                }
                Event::Empty(e) => {
                    let mut element = Self::element(reader, &e)?;
                    element.position = self.position(start, reader.buffer_position());
                    children.push(Node::Element(element));
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    self.append_text(&mut children, &text, start, reader.buffer_position());
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    let text = decode_entity(&entity);
                    self.append_text(&mut children, &text, start, reader.buffer_position());
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e);
                    self.append_text(&mut children, &text, start, reader.buffer_position());
                }
                Event::Comment(e) => {
                    let value = reader.decoder().decode(&e)?.into_owned();
                    children.push(Node::Comment(Comment { value }));
                }
                Event::End(e) => {
                    let end_tag = decode_name(reader, e.name().as_ref());
                    match parent_tag {
                        Some(tag) if end_tag == tag => {
                            return Ok((children, reader.buffer_position()));
                        }
                        None if end_tag == WRAPPER_TAG => {
                            return Ok((children, reader.buffer_position()));
                        }
                        // Mismatched end tag - continue
                        _ => {}
                    }
                }
                Event::Eof => return Ok((children, reader.buffer_position())),
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }
    }

    /// Append text to the last text child, or start a new text node.
    fn append_text(&self, children: &mut Vec<Node>, text: &str, start: u64, end: u64) {
        if let Some(Node::Text(last)) = children.last_mut() {
            last.value.push_str(text);
            if let Some(position) = &mut last.position {
                position.end = self.point(end);
            }
            return;
        }
        children.push(Node::Text(Text {
            value: text.to_owned(),
            position: self.position(start, end),
        }));
    }

    fn element<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> Result<Element, ParseError> {
        let mut element = Element::new(decode_name(reader, e.name().as_ref()));
        for attr in e.attributes().with_checks(false).flatten() {
            let key = decode_name(reader, attr.key.as_ref());
            let raw = reader.decoder().decode(&attr.value)?;
            let value = decode_references(&raw).into_owned();
            element.properties.insert(key, PropertyValue::String(value));
        }
        Ok(element)
    }
}

fn decode_name<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}
