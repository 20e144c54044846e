//! Rich-text value to tree construction.
//!
//! Contract:
//! - One left-to-right walk over the character buffer.
//! - The open format stack is synchronized to `formats[i]` by closing every
//!   element past the longest common prefix and opening the remainder, so
//!   nesting order always matches stack order.
//! - Consecutive characters under an unchanged stack coalesce into one text
//!   node.
//! - Replacement sentinels substitute the described element in place of text;
//!   they open and close no formats of their own.
//! - Selection boundaries are recorded after format synchronization at the
//!   same offset and before the character is emitted; an offset equal to the
//!   text length is recorded after the walk. Paths end with the character
//!   offset inside the located text node. A boundary with no open text
//!   pointer (next to a replacement or a paragraph edge) anchors to an empty
//!   text node materialized at that position.
//! - With a multiline tag, `LINE_SEPARATOR` closes all open formats and
//!   starts a fresh paragraph container under the root.
//! - Empty text yields an empty root and no selection paths.

use crate::namespaces::{Ns, namespace_for_tag};
use crate::types::{Attribute, Id, Node, TreePath};
use crate::value::{
    FormatDescriptor, LINE_SEPARATOR, OBJECT_REPLACEMENT_CHARACTER, ReplacementContent,
    ReplacementDescriptor, RichTextValue,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct BuildOptions<'a> {
    /// Paragraph container tag; when set, `LINE_SEPARATOR` splits paragraphs.
    pub multiline_tag: Option<&'a str>,
    /// Root container tag; defaults to `body`.
    pub root_tag: Option<&'a str>,
}

/// A freshly built tree plus the selection boundaries located within it.
#[derive(Debug)]
pub struct BuiltTree {
    pub root: Node,
    pub start_path: Option<TreePath>,
    pub end_path: Option<TreePath>,
}

pub fn build_tree(value: &RichTextValue, options: &BuildOptions<'_>) -> BuiltTree {
    debug_assert!(value.is_well_formed(), "rich-text value violates invariants");

    let mut arena = BuildArena::new();
    let root = arena.push(ArenaNode::element(None, options.root_tag.unwrap_or("body")));

    if value.is_empty() {
        return BuiltTree {
            root: arena.into_tree(root),
            start_path: None,
            end_path: None,
        };
    }

    let mut walk = Walk {
        arena,
        root,
        base: root,
        open: Vec::new(),
        stack: Vec::new(),
        pointer: None,
        start_path: None,
        end_path: None,
    };

    if let Some(tag) = options.multiline_tag {
        walk.base = walk.arena.add_element(root, tag);
    }

    for (i, ch) in value.text.chars().enumerate() {
        let paragraph_tag = options
            .multiline_tag
            .filter(|_| ch == LINE_SEPARATOR);
        if paragraph_tag.is_none() {
            walk.sync_formats(&value.formats[i]);
        }
        walk.record_boundaries(value, i);

        if let Some(tag) = paragraph_tag {
            log::trace!(target: "richdom.builder", "paragraph break at offset {i}");
            walk.open.clear();
            walk.stack.clear();
            walk.pointer = None;
            walk.base = walk.arena.add_element(walk.root, tag);
        } else if ch == OBJECT_REPLACEMENT_CHARACTER {
            if let Some(replacement) = value.replacements.get(&i) {
                let parent = walk.innermost();
                build_replacement(&mut walk.arena, parent, replacement);
            }
            walk.pointer = None;
        } else {
            let pointer = walk.ensure_pointer();
            walk.arena.push_char(pointer, ch);
        }
    }

    walk.record_boundaries(value, value.len());

    BuiltTree {
        root: walk.arena.into_tree(root),
        start_path: walk.start_path,
        end_path: walk.end_path,
    }
}

struct Walk<'a> {
    arena: BuildArena,
    root: usize,
    /// Current paragraph container (the root itself without a multiline tag).
    base: usize,
    /// Open format elements, innermost last.
    open: Vec<usize>,
    stack: Vec<&'a FormatDescriptor>,
    /// Text node currently receiving characters, if any.
    pointer: Option<usize>,
    start_path: Option<TreePath>,
    end_path: Option<TreePath>,
}

impl<'a> Walk<'a> {
    fn innermost(&self) -> usize {
        self.open.last().copied().unwrap_or(self.base)
    }

    fn sync_formats(&mut self, required: &'a [FormatDescriptor]) {
        let mut common = 0;
        while common < self.stack.len()
            && common < required.len()
            && *self.stack[common] == required[common]
        {
            common += 1;
        }
        if common == self.stack.len() && common == required.len() {
            return;
        }

        while self.stack.len() > common {
            let closed = self.stack.pop();
            self.open.pop();
            if let Some(format) = closed {
                log::trace!(target: "richdom.builder", "close <{}>", format.tag);
            }
        }
        for format in &required[common..] {
            let parent = self.innermost();
            let index = add_format_element(&mut self.arena, parent, format);
            log::trace!(target: "richdom.builder", "open <{}>", format.tag);
            self.open.push(index);
            self.stack.push(format);
        }
        self.pointer = None;
    }

    fn ensure_pointer(&mut self) -> usize {
        match self.pointer {
            Some(pointer) => pointer,
            None => {
                let parent = self.innermost();
                let pointer = self.arena.add_text(parent);
                self.pointer = Some(pointer);
                pointer
            }
        }
    }

    fn record_boundaries(&mut self, value: &RichTextValue, offset: usize) {
        if value.start != Some(offset) && value.end != Some(offset) {
            return;
        }
        let pointer = self.ensure_pointer();
        let mut path = self.arena.path_from_root(self.root, pointer);
        path.push(self.arena.text_len(pointer));
        if value.start == Some(offset) && self.start_path.is_none() {
            self.start_path = Some(path.clone());
        }
        if value.end == Some(offset) && self.end_path.is_none() {
            self.end_path = Some(path);
        }
    }
}

fn add_format_element(arena: &mut BuildArena, parent: usize, format: &FormatDescriptor) -> usize {
    let ns = element_namespace(arena, parent, &format.tag);
    let attributes = format
        .attributes
        .iter()
        .map(|(name, value)| Attribute::new(name.clone(), value.clone()))
        .collect();
    arena.add_child(
        parent,
        ArenaKind::Element {
            name: format.tag.clone(),
            ns,
            attributes,
            children: Vec::new(),
        },
    )
}

fn build_replacement(
    arena: &mut BuildArena,
    parent: usize,
    replacement: &ReplacementDescriptor,
) -> usize {
    log::trace!(target: "richdom.builder", "replacement <{}>", replacement.tag);
    let ns = element_namespace(arena, parent, &replacement.tag);
    let attributes = replacement
        .attributes
        .iter()
        .map(|(name, value)| Attribute::new(name.clone(), value.clone()))
        .collect();
    let index = arena.add_child(
        parent,
        ArenaKind::Element {
            name: replacement.tag.clone(),
            ns,
            attributes,
            children: Vec::new(),
        },
    );
    for child in &replacement.children {
        match child {
            ReplacementContent::Text(text) => {
                arena.add_child(index, ArenaKind::Text { text: text.clone() });
            }
            ReplacementContent::Element(inner) => {
                build_replacement(arena, index, inner);
            }
        }
    }
    index
}

/// Elements with no namespace of their own inherit SVG when created directly
/// under an SVG parent; everything else is pure name lookup.
fn element_namespace(arena: &BuildArena, parent: usize, tag: &str) -> Option<Ns> {
    namespace_for_tag(tag).or_else(|| {
        if arena.ns_of(parent) == Some(Ns::Svg) {
            Some(Ns::Svg)
        } else {
            None
        }
    })
}

#[derive(Debug)]
struct ArenaNode {
    parent: Option<usize>,
    kind: ArenaKind,
}

impl ArenaNode {
    fn element(parent: Option<usize>, name: &str) -> Self {
        Self {
            parent,
            kind: ArenaKind::Element {
                name: name.to_string(),
                ns: namespace_for_tag(name),
                attributes: Vec::new(),
                children: Vec::new(),
            },
        }
    }
}

#[derive(Debug)]
enum ArenaKind {
    Element {
        name: String,
        ns: Option<Ns>,
        attributes: Vec<Attribute>,
        children: Vec<usize>,
    },
    Text {
        text: String,
    },
}

impl ArenaKind {
    fn children(&self) -> Option<&[usize]> {
        match self {
            ArenaKind::Element { children, .. } => Some(children),
            ArenaKind::Text { .. } => None,
        }
    }
}

/// Index-linked working tree for a single build. Nodes are materialized into
/// an owned `Node` tree once the walk completes; nothing here outlives the
/// build call.
#[derive(Debug)]
struct BuildArena {
    nodes: Vec<ArenaNode>,
}

impl BuildArena {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    fn add_child(&mut self, parent_index: usize, kind: ArenaKind) -> usize {
        let child_index = self.push(ArenaNode {
            parent: Some(parent_index),
            kind,
        });
        match &mut self.nodes[parent_index].kind {
            ArenaKind::Element { children, .. } => children.push(child_index),
            ArenaKind::Text { .. } => unreachable!("tree builder parent cannot have children"),
        }
        child_index
    }

    fn add_element(&mut self, parent_index: usize, name: &str) -> usize {
        self.add_child(
            parent_index,
            ArenaKind::Element {
                name: name.to_string(),
                ns: namespace_for_tag(name),
                attributes: Vec::new(),
                children: Vec::new(),
            },
        )
    }

    fn add_text(&mut self, parent_index: usize) -> usize {
        self.add_child(parent_index, ArenaKind::Text { text: String::new() })
    }

    fn push_char(&mut self, index: usize, ch: char) {
        let ArenaKind::Text { text } = &mut self.nodes[index].kind else {
            unreachable!("tree builder pointer is always a text node");
        };
        text.push(ch);
    }

    fn text_len(&self, index: usize) -> usize {
        match &self.nodes[index].kind {
            ArenaKind::Text { text } => text.chars().count(),
            ArenaKind::Element { .. } => 0,
        }
    }

    fn ns_of(&self, index: usize) -> Option<Ns> {
        match &self.nodes[index].kind {
            ArenaKind::Element { ns, .. } => *ns,
            ArenaKind::Text { .. } => None,
        }
    }

    /// Child-index path from `root` down to `index`, exclusive of the root.
    fn path_from_root(&self, root: usize, index: usize) -> TreePath {
        let mut path = Vec::new();
        let mut current = index;
        while current != root {
            let parent = self.nodes[current]
                .parent
                .expect("tree builder nodes below the root always have a parent");
            let position = self.nodes[parent]
                .kind
                .children()
                .and_then(|children| children.iter().position(|&child| child == current))
                .expect("tree builder child is always linked to its parent");
            path.push(position);
            current = parent;
        }
        path.reverse();
        path
    }

    fn into_tree(self, root_index: usize) -> Node {
        let mut nodes = self.nodes;
        let mut built: Vec<Node> = Vec::with_capacity(nodes.len());

        fn take_children(n: usize, built: &mut Vec<Node>) -> Vec<Node> {
            let mut children = Vec::with_capacity(n);
            for _ in 0..n {
                children.push(built.pop().expect("tree builder child built"));
            }
            children.reverse();
            children
        }

        // Iterative postorder over the arena: when a node is seen the second
        // time, all of its descendants are on `built` and its direct children
        // are the last `child_count` entries in original order.
        let mut stack: Vec<(usize, bool)> = vec![(root_index, false)];
        while let Some((node_index, visited)) = stack.pop() {
            if !visited {
                stack.push((node_index, true));
                if let Some(children) = nodes[node_index].kind.children() {
                    for &child_index in children.iter().rev() {
                        stack.push((child_index, false));
                    }
                }
                continue;
            }

            let node = match &mut nodes[node_index].kind {
                ArenaKind::Element {
                    name,
                    ns,
                    attributes,
                    children,
                } => {
                    let child_count = children.len();
                    children.clear();
                    Node::Element {
                        id: Id::INVALID,
                        name: std::mem::take(name),
                        ns: *ns,
                        attributes: std::mem::take(attributes),
                        children: take_children(child_count, &mut built),
                    }
                }
                ArenaKind::Text { text } => Node::Text {
                    id: Id::INVALID,
                    text: std::mem::take(text),
                },
            };
            built.push(node);
        }

        assert_eq!(
            built.len(),
            1,
            "tree builder should materialize exactly one root node"
        );
        built.pop().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el<'n>(node: &'n Node, name: &str) -> &'n Node {
        match node {
            Node::Element {
                name: actual,
                children,
                ..
            } => {
                assert_eq!(actual, name);
                assert_eq!(children.len(), 1);
                &children[0]
            }
            Node::Text { .. } => panic!("expected element <{name}>"),
        }
    }

    #[test]
    fn empty_value_builds_empty_root() {
        let value = RichTextValue::from_plain("").with_selection(0, 0);
        let built = build_tree(&value, &BuildOptions::default());
        match &built.root {
            Node::Element { name, children, .. } => {
                assert_eq!(name, "body");
                assert!(children.is_empty());
            }
            Node::Text { .. } => panic!("root must be an element"),
        }
        assert_eq!(built.start_path, None);
        assert_eq!(built.end_path, None);
    }

    #[test]
    fn plain_text_coalesces_into_one_node() {
        let built = build_tree(&RichTextValue::from_plain("test"), &BuildOptions::default());
        let children = built.root.children().unwrap();
        assert_eq!(children.len(), 1);
        match &children[0] {
            Node::Text { text, .. } => assert_eq!(text, "test"),
            Node::Element { .. } => panic!("expected a single text node"),
        }
    }

    #[test]
    fn format_runs_open_and_close_by_stack_diff() {
        // "a[em b[strong c]em d]a" as per-character stacks.
        let mut value = RichTextValue::from_plain("abcd");
        value.apply_format(1..4, FormatDescriptor::new("em"));
        value.apply_format(2..3, FormatDescriptor::new("strong"));
        let built = build_tree(&value, &BuildOptions::default());

        let children = built.root.children().unwrap();
        assert_eq!(children.len(), 2);
        match &children[0] {
            Node::Text { text, .. } => assert_eq!(text, "a"),
            Node::Element { .. } => panic!("expected leading text node"),
        }
        let Node::Element { name, children, .. } = &children[1] else {
            panic!("expected <em>");
        };
        assert_eq!(name, "em");
        assert_eq!(children.len(), 3);
        let strong = el(&children[1], "strong");
        match strong {
            Node::Text { text, .. } => assert_eq!(text, "c"),
            Node::Element { .. } => panic!("expected text inside <strong>"),
        }
    }

    #[test]
    fn equal_adjacent_stacks_share_one_element() {
        let mut value = RichTextValue::from_plain("ab");
        let link = FormatDescriptor::new("a").with_attribute("href", "#x");
        value.apply_format(0..2, link);
        let built = build_tree(&value, &BuildOptions::default());
        let children = built.root.children().unwrap();
        assert_eq!(children.len(), 1, "equal stacks must not split the element");
    }

    #[test]
    fn differing_attributes_split_elements() {
        let mut value = RichTextValue::from_plain("ab");
        value.apply_format(0..1, FormatDescriptor::new("a").with_attribute("href", "#1"));
        value.apply_format(1..2, FormatDescriptor::new("a").with_attribute("href", "#2"));
        let built = build_tree(&value, &BuildOptions::default());
        assert_eq!(built.root.children().unwrap().len(), 2);
    }

    #[test]
    fn replacement_substitutes_element_for_sentinel() {
        let mut value = RichTextValue::from_plain("ab");
        value.insert_replacement(
            1,
            ReplacementDescriptor::new("img").with_attribute("src", "x.png"),
        );
        let built = build_tree(&value, &BuildOptions::default());
        let children = built.root.children().unwrap();
        assert_eq!(children.len(), 3);
        match &children[1] {
            Node::Element {
                name, attributes, ..
            } => {
                assert_eq!(name, "img");
                assert_eq!(attributes[0].name, "src");
            }
            Node::Text { .. } => panic!("expected replacement element"),
        }
        match &children[2] {
            Node::Text { text, .. } => assert_eq!(text, "b"),
            Node::Element { .. } => panic!("expected trailing text node"),
        }
    }

    #[test]
    fn replacement_inside_format_keeps_stack() {
        let mut value = RichTextValue::from_plain("ab");
        value.apply_format(0..2, FormatDescriptor::new("em"));
        value.insert_replacement(1, ReplacementDescriptor::new("img"));
        // The spliced sentinel position takes the same stack as its
        // neighbours, so a single <em> wraps text-img-text.
        value.formats[1] = value.formats[0].clone();
        let built = build_tree(&value, &BuildOptions::default());
        let children = built.root.children().unwrap();
        assert_eq!(children.len(), 1);
        let Node::Element { name, children, .. } = &children[0] else {
            panic!("expected <em>");
        };
        assert_eq!(name, "em");
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn selection_paths_locate_text_offsets() {
        let value = RichTextValue::from_plain("test").with_selection(1, 3);
        let built = build_tree(&value, &BuildOptions::default());
        assert_eq!(built.start_path, Some(vec![0, 1]));
        assert_eq!(built.end_path, Some(vec![0, 3]));
    }

    #[test]
    fn caret_at_end_of_text() {
        let value = RichTextValue::from_plain("test").with_selection(4, 4);
        let built = build_tree(&value, &BuildOptions::default());
        assert_eq!(built.start_path, Some(vec![0, 4]));
        assert_eq!(built.end_path, Some(vec![0, 4]));
    }

    #[test]
    fn caret_in_formatted_run_descends_into_format() {
        let mut value = RichTextValue::from_plain("ab");
        value.apply_format(1..2, FormatDescriptor::new("em"));
        let value = value.with_selection(1, 1);
        let built = build_tree(&value, &BuildOptions::default());
        // Boundary records after format sync: inside <em>, offset 0.
        assert_eq!(built.start_path, Some(vec![1, 0, 0]));
    }

    #[test]
    fn multiline_splits_paragraphs_and_prefixes_paths() {
        let mut value = RichTextValue::from_plain(format!("one{LINE_SEPARATOR}two"));
        value.start = Some(4);
        value.end = Some(4);
        let options = BuildOptions {
            multiline_tag: Some("p"),
            ..BuildOptions::default()
        };
        let built = build_tree(&value, &options);
        let paragraphs = built.root.children().unwrap();
        assert_eq!(paragraphs.len(), 2);
        for (paragraph, expected) in paragraphs.iter().zip(["one", "two"]) {
            let Node::Element { name, children, .. } = paragraph else {
                panic!("expected paragraph container");
            };
            assert_eq!(name, "p");
            match &children[0] {
                Node::Text { text, .. } => assert_eq!(text, expected),
                Node::Element { .. } => panic!("expected paragraph text"),
            }
        }
        // Offset 4 is the first character of the second paragraph.
        assert_eq!(built.start_path, Some(vec![1, 0, 0]));
    }

    #[test]
    fn svg_namespace_is_applied_and_inherited() {
        let mut value = RichTextValue::from_plain("a");
        value.apply_format(0..1, FormatDescriptor::new("svg"));
        value.insert_replacement(
            1,
            ReplacementDescriptor::new("unknown").with_attribute("xlink:href", "#ref"),
        );
        value.formats[1] = vec![FormatDescriptor::new("svg")];
        let built = build_tree(&value, &BuildOptions::default());
        let children = built.root.children().unwrap();
        let Node::Element {
            name, ns, children, ..
        } = &children[0]
        else {
            panic!("expected <svg>");
        };
        assert_eq!(name, "svg");
        assert_eq!(*ns, Some(Ns::Svg));
        let Node::Element {
            ns, attributes, ..
        } = &children[1]
        else {
            panic!("expected replacement under <svg>");
        };
        assert_eq!(*ns, Some(Ns::Svg), "unknown tag inherits svg namespace");
        assert_eq!(attributes[0].ns, Some(Ns::XLink));
    }

    #[test]
    fn build_tree_stress_deep_format_nesting() {
        let depth: usize = 10_000;
        let mut value = RichTextValue::from_plain("x");
        value.formats[0] = (0..depth).map(|_| FormatDescriptor::new("em")).collect();
        let built = build_tree(&value, &BuildOptions::default());

        let mut current = &built.root.children().unwrap()[0];
        let mut seen = 0usize;
        loop {
            match current {
                Node::Element { name, children, .. } => {
                    assert_eq!(name, "em");
                    seen += 1;
                    assert_eq!(children.len(), 1);
                    current = &children[0];
                }
                Node::Text { text, .. } => {
                    assert_eq!(text, "x");
                    assert_eq!(seen, depth);
                    break;
                }
            }
        }
    }
}
