//! Class attribute normalization.
//!
//! A `class` attribute may arrive as a raw string (parsed markup) or as an
//! already tokenized list (nodes built by transformers). [`ClassList`] folds
//! both shapes into one token list before membership is tested.

use crate::node::PropertyValue;

/// Normalized class tokens of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    /// Tokenize a raw class string on whitespace and commas.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Normalize an attribute value of any shape.
    ///
    /// Lists are taken as is, strings are tokenized with [`ClassList::parse`].
    /// A missing value or any other shape yields an empty list.
    #[must_use]
    pub fn from_property(value: Option<&PropertyValue>) -> Self {
        match value {
            Some(PropertyValue::String(raw)) => Self::parse(raw),
            Some(PropertyValue::List(tokens)) => Self(tokens.clone()),
            Some(PropertyValue::Number(_) | PropertyValue::Boolean(_)) | None => Self::default(),
        }
    }

    /// Exact token membership (no prefix matching).
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
