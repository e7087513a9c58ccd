//! Diagram node classification.

use rw_hast::Element;

use crate::consts::{CODE_CLASS, PRE_CLASS};
use crate::strategy::Strategy;

/// Whether `element` holds Mermaid source under `strategy`.
///
/// - `<pre class="mermaid">` counts unless the strategy is [`Strategy::PreMermaid`],
///   whose own output must not be picked up again.
/// - `<code class="language-mermaid">` counts under every strategy.
///
/// Class tokens must match exactly. A malformed class attribute means "not a diagram".
#[must_use]
pub fn is_diagram_element(element: &Element, strategy: Strategy) -> bool {
    match element.tag_name.as_str() {
        "pre" => strategy != Strategy::PreMermaid && element.class_list().contains(PRE_CLASS),
        "code" => element.class_list().contains(CODE_CLASS),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use rw_hast::PropertyValue;

    use super::*;

    fn with_class(tag: &str, class: impl Into<PropertyValue>) -> Element {
        Element::new(tag).with_property("class", class)
    }

    #[test]
    fn test_code_matches_under_every_strategy() {
        let code = with_class("code", "language-mermaid");

        for strategy in Strategy::ALL {
            assert!(is_diagram_element(&code, strategy), "{strategy}");
        }
    }

    #[test]
    fn test_pre_skipped_for_pre_mermaid() {
        let pre = with_class("pre", "mermaid");

        assert!(!is_diagram_element(&pre, Strategy::PreMermaid));
        assert!(is_diagram_element(&pre, Strategy::ImgPng));
        assert!(is_diagram_element(&pre, Strategy::ImgSvg));
        assert!(is_diagram_element(&pre, Strategy::InlineSvg));
    }

    #[test]
    fn test_markers_are_not_interchangeable() {
        assert!(!is_diagram_element(&with_class("pre", "language-mermaid"), Strategy::InlineSvg));
        assert!(!is_diagram_element(&with_class("code", "mermaid"), Strategy::InlineSvg));
    }

    #[test]
    fn test_exact_token_only() {
        assert!(!is_diagram_element(&with_class("code", "language-mermaid2"), Strategy::InlineSvg));
        assert!(!is_diagram_element(&with_class("pre", "mermaid-like"), Strategy::InlineSvg));
    }

    #[test]
    fn test_other_tags_never_match() {
        assert!(!is_diagram_element(&with_class("div", "mermaid"), Strategy::InlineSvg));
        assert!(!is_diagram_element(&with_class("span", "language-mermaid"), Strategy::InlineSvg));
    }

    #[test]
    fn test_class_shapes() {
        let listed = with_class("code", vec!["hl".to_owned(), "language-mermaid".to_owned()]);
        let joined = with_class("code", "hl,language-mermaid");
        let numeric = with_class("code", 1.0);
        let missing = Element::new("code");

        assert!(is_diagram_element(&listed, Strategy::InlineSvg));
        assert!(is_diagram_element(&joined, Strategy::InlineSvg));
        assert!(!is_diagram_element(&numeric, Strategy::InlineSvg));
        assert!(!is_diagram_element(&missing, Strategy::InlineSvg));
    }
}
