//! Deterministic HTML rendering of a host tree.
//!
//! Output rules:
//! - Attributes render in list order, always quoted.
//! - Text escapes `&`, `<`, `>`; attribute values additionally escape `"`.
//! - Void elements render without a closing tag; their children (none, by
//!   construction) are ignored.
//! - Namespaces are identity information, not markup; they do not render.

use crate::types::Node;
use memchr::memchr3;

pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Render only the children of `root`, the usual shape when the root is the
/// host container itself.
pub fn inner_html(root: &Node) -> String {
    let mut out = String::new();
    if let Some(children) = root.children() {
        for child in children {
            write_node(child, &mut out);
        }
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => escape_text(text, out),
        Node::Element {
            name,
            attributes,
            children,
            ..
        } => {
            out.push('<');
            out.push_str(name);
            for attribute in attributes {
                out.push(' ');
                out.push_str(&attribute.name);
                out.push_str("=\"");
                escape_attribute(&attribute.value, out);
                out.push('"');
            }
            out.push('>');
            if is_void(name) {
                return;
            }
            for child in children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

fn escape_text(text: &str, out: &mut String) {
    // Fast path: nothing to escape in the whole run.
    if memchr3(b'&', b'<', b'>', text.as_bytes()).is_none() {
        out.push_str(text);
        return;
    }
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    if memchr3(b'&', b'<', b'"', value.as_bytes()).is_none() {
        out.push_str(value);
        return;
    }
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
