//! Helpers shared by the static and dynamic backends.

use scraper::Selector;
use tracing::warn;

/// Attributes collected into a node's attribute map. Anything else is still
/// reachable through a direct `get_attribute` lookup.
pub const ATTRIBUTES: &[&str] = &[
    "accept",
    "accesskey",
    "action",
    "align",
    "alt",
    "autocomplete",
    "autofocus",
    "checked",
    "class",
    "cols",
    "colspan",
    "content",
    "contenteditable",
    "data",
    "datetime",
    "dir",
    "disabled",
    "download",
    "draggable",
    "enctype",
    "for",
    "form",
    "headers",
    "height",
    "hidden",
    "href",
    "hreflang",
    "id",
    "label",
    "lang",
    "list",
    "max",
    "maxlength",
    "media",
    "method",
    "min",
    "multiple",
    "name",
    "pattern",
    "placeholder",
    "readonly",
    "rel",
    "required",
    "role",
    "rows",
    "rowspan",
    "selected",
    "size",
    "span",
    "src",
    "srcset",
    "start",
    "step",
    "style",
    "tabindex",
    "target",
    "title",
    "type",
    "value",
    "width",
    "wrap",
];

pub fn is_recognized_attribute(name: &str) -> bool {
    ATTRIBUTES.contains(&name)
}

/// Parse a CSS selector. An invalid selector matches nothing, so callers
/// get `None` here and treat it as an empty result.
pub fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(selector = selector, error = %e, "Invalid CSS selector, matching nothing");
            None
        }
    }
}

/// Element names are reported upper-case, as browsers do for HTML documents.
pub fn element_node_name(tag: &str) -> String {
    tag.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector() {
        assert!(parse_selector("div > p.a").is_some());
        assert!(parse_selector("p[").is_none());
        assert!(parse_selector("").is_none());
    }

    #[test]
    fn test_recognized_attributes() {
        assert!(is_recognized_attribute("class"));
        assert!(is_recognized_attribute("href"));
        assert!(!is_recognized_attribute("data-id"));
    }

    #[test]
    fn test_element_node_name() {
        assert_eq!(element_node_name("div"), "DIV");
    }
}
