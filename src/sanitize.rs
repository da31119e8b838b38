//! Cleans the encyclopedia's HTML body before it is placed in the page.

use kuchiki::NodeRef;
use kuchiki::traits::*;
use tracing::debug;

/// Chrome that makes no sense outside the encyclopedia itself.
pub const DEFAULT_DENYLIST: &[&str] = &[
    ".mw-editsection",
    "sup.reference",
    ".mw-ref",
    ".reference",
    ".noprint",
    ".navbox",
    ".infobox",
    ".metadata",
    ".hatnote",
    ".shortdescription",
    "script",
    "style",
    "link",
    "meta",
];

/// Inline presentation for the structural elements that survive. Colors come
/// from the page's theme variables so both themes style the body.
pub const DEFAULT_STYLES: &[(&str, &str)] = &[
    (
        "table",
        "width: 100%; border-collapse: collapse; margin: 1.5rem 0; background: var(--card-bg);",
    ),
    (
        "td, th",
        "border: 1px solid var(--border-color); padding: 0.5rem 0.75rem; text-align: left; color: var(--text-color);",
    ),
    (
        "h1, h2, h3, h4, h5, h6",
        "color: var(--heading-color); margin: 1.75rem 0 0.75rem; line-height: 1.3;",
    ),
    (
        "p",
        "margin: 0 0 1rem; line-height: 1.7; color: var(--text-color);",
    ),
    ("ul, ol", "margin: 0 0 1rem 1.5rem; padding-left: 1rem;"),
    ("li", "margin-bottom: 0.35rem; line-height: 1.6;"),
];

#[derive(Debug, Clone)]
pub struct Sanitizer {
    denylist: Vec<String>,
    styles: Vec<(String, String)>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            DEFAULT_STYLES
                .iter()
                .map(|(selector, style)| (selector.to_string(), style.to_string()))
                .collect(),
        )
    }
}

impl Sanitizer {
    pub fn new(denylist: Vec<String>, styles: Vec<(String, String)>) -> Self {
        Self { denylist, styles }
    }

    /// Strips denylisted elements, applies inline styles and returns the
    /// body markup. Malformed input is repaired by the HTML parser; the result
    /// is a fixed point of `sanitize`.
    pub fn sanitize(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }
        let document = kuchiki::parse_html().one(html);
        for selector in &self.denylist {
            remove_matching(&document, selector);
        }
        for (selector, style) in &self.styles {
            apply_style(&document, selector, style);
        }
        restore_leading_newlines(&document);
        body_markup(&document)
    }
}

/// Sanitizes with the default denylist and styles.
pub fn sanitize(html: &str) -> String {
    Sanitizer::default().sanitize(html)
}

fn remove_matching(document: &NodeRef, selector: &str) {
    let Ok(matches) = document.select(selector) else {
        debug!(selector, "skipping invalid denylist selector");
        return;
    };
    // Collect first; detaching during traversal would cut the walk short.
    let nodes: Vec<_> = matches.collect();
    for node in nodes {
        node.as_node().detach();
    }
}

fn apply_style(document: &NodeRef, selector: &str, style: &str) {
    let Ok(matches) = document.select(selector) else {
        debug!(selector, "skipping invalid style selector");
        return;
    };
    for element in matches {
        element
            .attributes
            .borrow_mut()
            .insert("style", style.to_string());
    }
}

/// The parser drops one newline right after `<pre>`, `<textarea>` and
/// `<listing>` and the serializer does not write it back, so a text child that
/// still starts with a newline gets one extra to survive the next parse.
fn restore_leading_newlines(document: &NodeRef) {
    let Ok(blocks) = document.select("pre, textarea, listing") else {
        return;
    };
    for block in blocks {
        let Some(first) = block.as_node().first_child() else {
            continue;
        };
        if let Some(text) = first.as_text() {
            let mut text = text.borrow_mut();
            if text.starts_with('\n') {
                text.insert(0, '\n');
            }
        }
    }
}

fn body_markup(document: &NodeRef) -> String {
    let Ok(body) = document.select_first("body") else {
        return String::new();
    };
    let mut out = Vec::new();
    for child in body.as_node().children() {
        if child.serialize(&mut out).is_err() {
            break;
        }
    }
    String::from_utf8_lossy(&out).trim().to_string()
}
