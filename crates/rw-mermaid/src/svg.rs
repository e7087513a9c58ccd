//! SVG and PNG inspection for rendered diagrams.
//!
//! Renderers hand back raw markup. The result mapper needs the root id,
//! accessible title/description and display dimensions, and inline SVGs on
//! one page need distinct ids.

use std::sync::LazyLock;

use regex::Regex;
use rw_hast::{Element, parse_fragment};

use crate::error::RenderError;

/// Opening tag of the SVG root element.
static SVG_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg\b").unwrap());

/// Separators inside a `viewBox` value.
static VIEWBOX_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s,]+").unwrap());

/// Metadata read from the root `<svg>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgMetadata {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SvgMetadata {
    /// Parse `svg` and read metadata from its root element.
    ///
    /// Dimensions come from `viewBox`, falling back to numeric `width` and
    /// `height` attributes (a `px` suffix is accepted).
    pub fn extract(svg: &str) -> Result<Self, RenderError> {
        let root = parse_fragment(svg).map_err(|e| RenderError::InvalidSvg(e.to_string()))?;
        let element = root
            .first_element()
            .filter(|element| element.is("svg"))
            .ok_or_else(|| RenderError::InvalidSvg("no <svg> root element".to_owned()))?;

        let (width, height) = match view_box_size(element) {
            Some((width, height)) => (Some(width), Some(height)),
            None => (length(element, "width"), length(element, "height")),
        };

        Ok(Self {
            id: attribute(element, "id"),
            title: child_text(element, "title"),
            description: child_text(element, "desc"),
            width,
            height,
        })
    }
}

fn attribute(element: &Element, name: &str) -> Option<String> {
    element
        .property(name)
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn child_text(element: &Element, tag_name: &str) -> Option<String> {
    let child = element
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .find(|child| child.is(tag_name))?;
    let text = child.text_content();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

fn view_box_size(element: &Element) -> Option<(f64, f64)> {
    let view_box = element.property("viewBox")?.as_str()?;
    let values: Vec<f64> = VIEWBOX_SEPARATOR_RE
        .split(view_box.trim())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [_, _, width, height] if *width > 0.0 && *height > 0.0 => Some((*width, *height)),
        _ => None,
    }
}

fn length(element: &Element, name: &str) -> Option<f64> {
    let value = element.property(name)?.as_str()?.trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value.parse().ok().filter(|value: &f64| *value > 0.0)
}

/// Give the SVG root element the id `new_id`.
///
/// References to the old id (`id="old"`, `#old` in CSS and `url(#old)`) are
/// rewritten too. An SVG without an id gets one.
pub fn rename_root_id(
    svg: &str,
    old_id: Option<&str>,
    new_id: &str,
) -> Result<String, RenderError> {
    let Some(old_id) = old_id.filter(|id| !id.is_empty()) else {
        return Ok(SVG_OPEN_RE
            .replace(svg, format!(r#"<svg id="{new_id}""#))
            .into_owned());
    };

    let pattern = format!(r##"(["#]){}([^A-Za-z0-9_-]|$)"##, regex::escape(old_id));
    let references = Regex::new(&pattern).map_err(|e| RenderError::InvalidSvg(e.to_string()))?;
    Ok(references
        .replace_all(svg, format!("${{1}}{new_id}${{2}}"))
        .into_owned())
}

/// Extract width and height from PNG image data.
///
/// PNG format: 8-byte signature, then IHDR chunk with width/height at bytes 16-24.
#[must_use]
pub fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 {
        return None;
    }

    if &data[0..8] != b"\x89PNG\r\n\x1a\n" {
        return None;
    }

    // IHDR chunk: width at bytes 16-20, height at bytes 20-24 (big-endian)
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}
