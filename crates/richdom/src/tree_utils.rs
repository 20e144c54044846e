use crate::types::{Id, Node, TreePath};

/// Assign fresh ids to every node that still carries `Id::INVALID`. Existing
/// ids are kept, so running this after a patch only labels moved-in nodes.
pub fn assign_node_ids(root: &mut Node) {
    fn walk(node: &mut Node, next: &mut u32) {
        if node.id() == Id::INVALID {
            let id = Id(*next);
            *next = next.wrapping_add(1);
            node.set_id(id);
        }
        if let Node::Element { children, .. } = node {
            for child in children {
                walk(child, next);
            }
        }
    }

    let mut next = highest_id(root).wrapping_add(1).max(1);
    walk(root, &mut next);
}

fn highest_id(root: &Node) -> u32 {
    let mut highest = root.id().0;
    if let Some(children) = root.children() {
        for child in children {
            highest = highest.max(highest_id(child));
        }
    }
    highest
}

pub fn find_node_by_id(node: &Node, id: Id) -> Option<&Node> {
    if node.id() == id {
        return Some(node);
    }
    if let Some(children) = node.children() {
        for child in children {
            if let Some(found) = find_node_by_id(child, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Resolve a child-index path (without a trailing text offset) to a node.
pub fn node_at_path<'a>(root: &'a Node, path: &[usize]) -> Option<&'a Node> {
    let mut current = root;
    for &index in path {
        current = current.children()?.get(index)?;
    }
    Some(current)
}

/// Resolve a selection boundary path to its node and character offset. The
/// located node is the text node the builder recorded; the offset is valid
/// within its content (equal lengths mean a caret at the node's end).
pub fn resolve_boundary<'a>(root: &'a Node, path: &TreePath) -> Option<(&'a Node, usize)> {
    let (&offset, node_path) = path.split_last()?;
    let node = node_at_path(root, node_path)?;
    match node {
        Node::Text { text, .. } if offset <= text.chars().count() => Some((node, offset)),
        _ => None,
    }
}

/// Concatenated text content of a subtree, replacements excluded.
pub fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::Element { children, .. } => {
            for child in children {
                collect_text(child, out);
            }
        }
    }
}
