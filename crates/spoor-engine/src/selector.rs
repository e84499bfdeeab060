//! Selector derivation for observed elements.
//!
//! Events arrive with a snapshot of the target element, not a locator. The
//! recorded selector is derived here with a fixed priority: id attribute,
//! then name attribute, then the first class token, then the lowercased
//! tag name. The result is a plain string; whether it uniquely matches on
//! replay is out of scope.

use spoor_common::protocol::ElementInfo;

/// Derive the selector recorded for `element`. Never returns an empty
/// string; an element with no usable attributes and no tag yields `"*"`.
pub fn resolve(element: &ElementInfo) -> String {
    if let Some(id) = non_empty(element.attributes.get("id")) {
        return format!("#{}", id);
    }
    if let Some(name) = non_empty(element.attributes.get("name")) {
        return format!("[name=\"{}\"]", name);
    }
    if let Some(class) = element
        .attributes
        .get("class")
        .and_then(|c| c.split_whitespace().next())
    {
        return format!(".{}", class);
    }
    let tag = element.tag.to_lowercase();
    if tag.is_empty() { "*".to_string() } else { tag }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}
