//! HTML document tree for RW transformers.
//!
//! This crate provides a small, owned document tree in the spirit of hast:
//! - [`Root`], [`Node`], [`Element`]: the tree itself, mutated in place by transformers
//! - [`PropertyValue`], [`ClassList`]: attribute values and class-token normalization
//! - [`parse_fragment`]: XHTML/SVG fragment parser built on `quick-xml`
//! - [`to_html`]: HTML serializer
//!
//! # Example
//!
//! ```
//! use rw_hast::{parse_fragment, to_html};
//!
//! let root = parse_fragment(r#"<pre><code class="language-mermaid">graph TD</code></pre>"#).unwrap();
//! let code = root.children[0].as_element().unwrap().children[0].as_element().unwrap();
//!
//! assert!(code.class_list().contains("language-mermaid"));
//! assert_eq!(code.text_content(), "graph TD");
//! assert_eq!(to_html(&root), r#"<pre><code class="language-mermaid">graph TD</code></pre>"#);
//! ```

mod class;
mod entities;
mod node;
mod parse;
mod serialize;

pub use class::ClassList;
pub use node::{Comment, Element, Node, Point, Position, Properties, PropertyValue, Root, Text};
pub use parse::{ParseError, parse_fragment};
pub use serialize::{element_to_html, escape_html, to_html};
