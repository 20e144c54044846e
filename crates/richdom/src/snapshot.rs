//! Deterministic tree serialization and equality rules for tests.
//! Not a public stable format; intended for internal structural comparisons.
//!
//! Equivalence rules:
//! - Node kinds must match.
//! - Element names and namespaces must match.
//! - Attribute list order is significant; names, values, and namespaces must
//!   match.
//! - Text nodes must match exactly.
//! - Ids can be ignored by options (the default: built trees carry
//!   `Id::INVALID` until ids are assigned).

use crate::namespaces::Ns;
use crate::types::Node;
use std::fmt::{self, Write};
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug)]
pub struct SnapshotOptions {
    pub ignore_ids: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self { ignore_ids: true }
    }
}

#[derive(Debug)]
pub struct TreeSnapshot {
    lines: Vec<String>,
}

impl TreeSnapshot {
    pub fn new(root: &Node, options: SnapshotOptions) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, &options, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct TreeMismatch<'a> {
    path: String,
    detail: String,
    expected: String,
    actual: String,
    expected_node: &'a Node,
    actual_node: &'a Node,
    options: SnapshotOptions,
    expected_subtree: OnceLock<String>,
    actual_subtree: OnceLock<String>,
}

impl fmt::Display for TreeMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected_subtree = self
            .expected_subtree
            .get_or_init(|| TreeSnapshot::new(self.expected_node, self.options).render());
        let actual_subtree = self
            .actual_subtree
            .get_or_init(|| TreeSnapshot::new(self.actual_node, self.options).render());
        writeln!(f, "tree mismatch at {}: {}", self.path, self.detail)?;
        writeln!(f, "expected: {}", self.expected)?;
        writeln!(f, "actual:   {}", self.actual)?;
        writeln!(f, "expected subtree:\n{}", expected_subtree)?;
        writeln!(f, "actual subtree:\n{}", actual_subtree)?;
        Ok(())
    }
}

impl std::error::Error for TreeMismatch<'_> {}

pub fn assert_tree_eq(expected: &Node, actual: &Node, options: SnapshotOptions) {
    if let Err(mismatch) = compare_tree(expected, actual, options) {
        panic!("{mismatch}");
    }
}

pub fn compare_tree<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: SnapshotOptions,
) -> Result<(), Box<TreeMismatch<'a>>> {
    let mut path = vec![node_label(expected)];
    compare_nodes(expected, actual, &options, &mut path)
}

fn compare_nodes<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: &SnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<TreeMismatch<'a>>> {
    match (expected, actual) {
        (
            Node::Element {
                id: expected_id,
                name: expected_name,
                ns: expected_ns,
                attributes: expected_attrs,
                children: expected_children,
            },
            Node::Element {
                id: actual_id,
                name: actual_name,
                ns: actual_ns,
                attributes: actual_attrs,
                children: actual_children,
            },
        ) => {
            if !options.ignore_ids && expected_id != actual_id {
                return Err(Box::new(mismatch(
                    path,
                    "element id",
                    expected,
                    actual,
                    options,
                )));
            }
            if expected_name != actual_name {
                return Err(Box::new(mismatch(
                    path,
                    "element name",
                    expected,
                    actual,
                    options,
                )));
            }
            if expected_ns != actual_ns {
                return Err(Box::new(mismatch(
                    path,
                    "element namespace",
                    expected,
                    actual,
                    options,
                )));
            }
            if expected_attrs.len() != actual_attrs.len() {
                return Err(Box::new(mismatch(
                    path,
                    "attribute count",
                    expected,
                    actual,
                    options,
                )));
            }
            for (i, (exp, act)) in expected_attrs.iter().zip(actual_attrs.iter()).enumerate() {
                if exp != act {
                    return Err(Box::new(mismatch(
                        path,
                        &format!("attribute at index {i}"),
                        expected,
                        actual,
                        options,
                    )));
                }
            }
            compare_children(
                expected,
                actual,
                expected_children,
                actual_children,
                options,
                path,
            )
        }
        (
            Node::Text {
                id: expected_id,
                text: expected_text,
            },
            Node::Text {
                id: actual_id,
                text: actual_text,
            },
        ) => {
            if !options.ignore_ids && expected_id != actual_id {
                return Err(Box::new(mismatch(
                    path, "text id", expected, actual, options,
                )));
            }
            if expected_text != actual_text {
                return Err(Box::new(mismatch(path, "text", expected, actual, options)));
            }
            Ok(())
        }
        _ => Err(Box::new(mismatch(
            path,
            "node kind",
            expected,
            actual,
            options,
        ))),
    }
}

fn compare_children<'a>(
    expected_parent: &'a Node,
    actual_parent: &'a Node,
    expected: &'a [Node],
    actual: &'a [Node],
    options: &SnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<TreeMismatch<'a>>> {
    if expected.len() != actual.len() {
        return Err(Box::new(mismatch(
            path,
            &format!(
                "child count (expected {}, actual {})",
                expected.len(),
                actual.len()
            ),
            expected_parent,
            actual_parent,
            options,
        )));
    }
    for (idx, (exp, act)) in expected.iter().zip(actual.iter()).enumerate() {
        path.push(format!("{}[{}]", node_label(exp), idx));
        let result = compare_nodes(exp, act, options, path);
        path.pop();
        result?;
    }
    Ok(())
}

fn mismatch<'a>(
    path: &[String],
    detail: &str,
    expected: &'a Node,
    actual: &'a Node,
    options: &SnapshotOptions,
) -> TreeMismatch<'a> {
    let path = format!("/{}", path.join("/"));
    TreeMismatch {
        path,
        detail: detail.to_string(),
        expected: truncate_line(format_node_line(expected, options), 160),
        actual: truncate_line(format_node_line(actual, options), 160),
        expected_node: expected,
        actual_node: actual,
        options: *options,
        expected_subtree: OnceLock::new(),
        actual_subtree: OnceLock::new(),
    }
}

fn node_label(node: &Node) -> String {
    match node {
        Node::Element { name, .. } => name.to_string(),
        Node::Text { .. } => "#text".to_string(),
    }
}

fn truncate_line(mut line: String, max_len: usize) -> String {
    if line.len() > max_len {
        line.truncate(max_len.saturating_sub(3));
        line.push_str("...");
    }
    line
}

fn walk_snapshot(node: &Node, options: &SnapshotOptions, depth: usize, out: &mut Vec<String>) {
    let mut line = " ".repeat(depth * 2);
    write_node_line(&mut line, node, options);
    out.push(line);
    if let Node::Element { children, .. } = node {
        for child in children {
            walk_snapshot(child, options, depth + 1, out);
        }
    }
}

fn format_node_line(node: &Node, options: &SnapshotOptions) -> String {
    let mut line = String::new();
    write_node_line(&mut line, node, options);
    line
}

fn write_node_line(out: &mut String, node: &Node, options: &SnapshotOptions) {
    match node {
        Node::Element {
            id,
            name,
            ns,
            attributes,
            ..
        } => {
            out.push('<');
            out.push_str(name);
            if let Some(ns) = ns {
                out.push_str(" xmlns=\"");
                out.push_str(ns_label(*ns));
                out.push('"');
            }
            for attribute in attributes {
                out.push(' ');
                out.push_str(&attribute.name);
                out.push_str("=\"");
                write_escaped(out, &attribute.value);
                out.push('"');
            }
            if !options.ignore_ids {
                let _ = write!(out, " data-node-id=\"{}\"", id.0);
            }
            out.push('>');
        }
        Node::Text { id, text } => {
            out.push('"');
            write_escaped(out, text);
            out.push('"');
            if !options.ignore_ids {
                let _ = write!(out, " id={}", id.0);
            }
        }
    }
}

fn ns_label(ns: Ns) -> &'static str {
    ns.uri()
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii() => out.push(ch),
            _ => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
        }
    }
}
