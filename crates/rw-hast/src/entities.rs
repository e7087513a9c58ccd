//! Character reference decoding for text and attribute values.
//!
//! The fragment parser sees entity references as separate events. Both those
//! and references inside raw attribute values resolve through [`decode_entity`],
//! which knows the XML built-ins, numeric references and the named HTML
//! entities that show up in rendered documents.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Character reference inside an attribute value (`&name;`, `&#10;`, `&#x1F;`).
static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z][a-zA-Z0-9]*);").expect("invalid reference regex"));

/// Decode an entity name (without `&` and `;`) to its text.
///
/// Unknown entities are preserved as written.
pub(crate) fn decode_entity(entity: &str) -> String {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = if let Some(hex) = numeric.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()
        } else {
            numeric.parse::<u32>().ok()
        };
        return code
            .and_then(char::from_u32)
            .map_or_else(|| format!("&{entity};"), |c| c.to_string());
    }

    named_entity(entity).map_or_else(|| format!("&{entity};"), str::to_owned)
}

/// Decode every character reference in a raw attribute value.
pub(crate) fn decode_references(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    REFERENCE_PATTERN.replace_all(raw, |caps: &regex::Captures| decode_entity(&caps[1]))
}

/// Map an HTML entity name to its text.
fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        // XML built-ins
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",

        // Common entities
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",

        // Arrows
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "harr" => "\u{2194}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",

        // Math symbols
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "plusmn" => "\u{00b1}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",

        // Legal and currency
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",

        // Misc symbols
        "deg" => "\u{00b0}",
        "para" => "\u{00b6}",
        "sect" => "\u{00a7}",
        "middot" => "\u{00b7}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "zwj" => "\u{200d}",
        "zwnj" => "\u{200c}",

        _ => return None,
    })
}
