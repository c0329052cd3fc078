//! JavaScript snippets run against tagged nodes
//!
//! Matched elements are tagged with a `data-pom-node` attribute so a later
//! command can find the same node again, or tell that the page replaced it.

use crate::session::selector::{js_string, By};
use crate::session::traits::NodeId;

/// Attribute carrying the node handle
pub const NODE_ATTR: &str = "data-pom-node";

/// Script-dispatched click, used when a native click is refused
pub const SCRIPT_CLICK: &str = "el.click(); return true;";

pub const SCROLL_INTO_VIEW: &str = "el.scrollIntoView({block: 'center', inline: 'center'}); return true;";

pub const TEXT: &str = "return (el.innerText !== undefined ? el.innerText : el.textContent) || '';";

pub const IS_SELECTED: &str = "return !!(el.checked || el.selected);";

pub const FOCUS: &str = "el.focus(); return true;";

pub const CLEAR: &str = "el.focus(); \
    if ('value' in el) { \
        el.value = ''; \
        el.dispatchEvent(new Event('input', {bubbles: true})); \
        el.dispatchEvent(new Event('change', {bubbles: true})); \
    } else if (el.isContentEditable) { \
        el.textContent = ''; \
    } \
    return true;";

/// Visibility check; option nodes inherit the visibility of their select
pub const IS_DISPLAYED: &str = "const visible = (n) => { \
        const s = getComputedStyle(n); \
        if (s.display === 'none' || s.visibility === 'hidden' || parseFloat(s.opacity) === 0) return false; \
        const r = n.getBoundingClientRect(); \
        return r.width > 0 && r.height > 0; \
    }; \
    if (el.tagName === 'OPTION') { \
        const select = el.closest('select'); \
        return !el.hidden && getComputedStyle(el).display !== 'none' && (!select || visible(select)); \
    } \
    return visible(el);";

/// Scroll the node into view and report its centre point
pub const CLICK_POINT: &str = "el.scrollIntoView({block: 'center', inline: 'center'}); \
    const r = el.getBoundingClientRect(); \
    return {x: r.left + r.width / 2, y: r.top + r.height / 2, width: r.width, height: r.height, tag: el.tagName.toLowerCase()};";

/// Options render outside the page, so they are selected through the DOM
pub const SELECT_OPTION: &str = "if (el.disabled) throw new Error('option is disabled'); \
    el.selected = true; \
    const select = el.closest('select'); \
    if (select) { \
        select.dispatchEvent(new Event('input', {bubbles: true})); \
        select.dispatchEvent(new Event('change', {bubbles: true})); \
    } \
    return true;";

pub fn attribute(name: &str) -> String {
    format!("return el.getAttribute({});", js_string(name))
}

pub fn property(name: &str) -> String {
    format!(
        "const v = el[{0}]; return v === undefined ? null : v;",
        js_string(name)
    )
}

fn node_lookup(node: &NodeId) -> String {
    format!(
        "document.querySelector('[{}=\"' + CSS.escape({}) + '\"]')",
        NODE_ATTR,
        js_string(node.as_str())
    )
}

/// Find and tag nodes; evaluates to `null` when the scope node is gone
///
/// Tags carry the document's `performance.timeOrigin`, so a tag taken before a
/// navigation never matches a node of the next document.
pub fn find_nodes(selector: &By, scope: Option<&NodeId>, tag_prefix: &str) -> String {
    let root = match scope {
        Some(node) => node_lookup(node),
        None => "document".to_string(),
    };

    format!(
        "(() => {{ \
            const root = {root}; \
            if (!root) return null; \
            const found = {query}; \
            window.__pomSeq = window.__pomSeq || 0; \
            window.__pomDoc = window.__pomDoc || Math.floor(performance.timeOrigin).toString(36); \
            return found.map(el => {{ \
                if (!el.hasAttribute('{attr}')) el.setAttribute('{attr}', {prefix} + '-' + window.__pomDoc + '-' + (++window.__pomSeq)); \
                return el.getAttribute('{attr}'); \
            }}); \
        }})()",
        root = root,
        query = selector.query_expression("root"),
        attr = NODE_ATTR,
        prefix = js_string(tag_prefix),
    )
}

/// Run `body` with the node bound to `el`
///
/// Evaluates to `{stale: true}` when the node is no longer attached, otherwise
/// `{stale: false, value: <body result>}`.
pub fn on_node(node: &NodeId, body: &str) -> String {
    format!(
        "(() => {{ \
            const el = {lookup}; \
            if (!el) return {{stale: true}}; \
            const value = (() => {{ {body} }})(); \
            return {{stale: false, value: value === undefined ? null : value}}; \
        }})()",
        lookup = node_lookup(node),
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nodes_scoped() {
        let script = find_nodes(&By::css("option"), Some(&NodeId::new("s1-4")), "s1");
        assert!(script.contains("CSS.escape(\"s1-4\")"));
        assert!(script.contains("root.querySelectorAll(\"option\")"));
        assert!(script.contains("if (!root) return null;"));
    }

    #[test]
    fn test_node_tags_differ_across_documents() {
        let script = find_nodes(&By::css(".review"), None, "s1");
        assert!(script.contains("window.__pomDoc = window.__pomDoc || Math.floor(performance.timeOrigin).toString(36);"));
        assert!(script.contains("\"s1\" + '-' + window.__pomDoc + '-' + (++window.__pomSeq)"));
    }

    #[test]
    fn test_find_nodes_document() {
        let script = find_nodes(&By::id("email"), None, "s1");
        assert!(script.contains("const root = document;"));
        assert!(script.contains(NODE_ATTR));
    }

    #[test]
    fn test_on_node_wraps_body() {
        let script = on_node(&NodeId::new("s1-1"), &attribute("value"));
        assert!(script.contains("return {stale: true};"));
        assert!(script.contains("el.getAttribute(\"value\")"));
    }
}
