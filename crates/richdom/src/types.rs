use crate::namespaces::{Ns, namespace_for_attribute};

pub type NodeId = u32;

/// Stable node identity within a host tree.
///
/// Freshly built nodes carry `Id::INVALID` until `tree_utils::assign_node_ids`
/// runs over the tree. The patcher never rewrites ids on nodes it keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Id(pub NodeId);

impl Id {
    pub const INVALID: Id = Id(0);
}

/// Ordered element attribute. The namespace is derived from the name
/// (`xlink:`-prefixed names carry the XLink namespace) and is never threaded
/// through build or patch logic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub ns: Option<Ns>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let ns = namespace_for_attribute(&name);
        Self {
            name,
            value: value.into(),
            ns,
        }
    }
}

/// Host tree node: a text leaf or an element with ordered children.
///
/// The tree is owned top-down; child lists are plain vectors so the patcher
/// can detach and reattach subtrees by position while untouched nodes keep
/// their `Id`.
#[derive(Clone, Debug)]
pub enum Node {
    Element {
        id: Id,
        name: String,
        ns: Option<Ns>,
        attributes: Vec<Attribute>,
        children: Vec<Node>,
    },
    Text {
        id: Id,
        text: String,
    },
}

impl Node {
    pub fn element(name: impl Into<String>) -> Self {
        let name = name.into();
        let ns = crate::namespaces::namespace_for_tag(&name);
        Node::Element {
            id: Id::INVALID,
            name,
            ns,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text {
            id: Id::INVALID,
            text: text.into(),
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Node::Element { id, .. } => *id,
            Node::Text { id, .. } => *id,
        }
    }

    pub fn set_id(&mut self, new_id: Id) {
        match self {
            Node::Element { id, .. } => *id = new_id,
            Node::Text { id, .. } => *id = new_id,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Element { children, .. } => Some(children),
            Node::Text { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element { children, .. } => Some(children),
            Node::Text { .. } => None,
        }
    }

    /// Structural equality: kind, name, namespace, attributes, text, and
    /// children, ignoring ids. This is the equality the patcher keys off;
    /// two nodes can be equal while having distinct identities.
    pub fn structurally_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (
                Node::Text { text, .. },
                Node::Text {
                    text: other_text, ..
                },
            ) => text == other_text,
            (
                Node::Element {
                    name,
                    ns,
                    attributes,
                    children,
                    ..
                },
                Node::Element {
                    name: other_name,
                    ns: other_ns,
                    attributes: other_attributes,
                    children: other_children,
                    ..
                },
            ) => {
                name == other_name
                    && ns == other_ns
                    && attributes == other_attributes
                    && children.len() == other_children.len()
                    && children
                        .iter()
                        .zip(other_children.iter())
                        .all(|(a, b)| a.structurally_eq(b))
            }
            _ => false,
        }
    }
}

/// Child-index path from a tree root down to a boundary position. The final
/// component is the character offset inside the located text node.
pub type TreePath = Vec<usize>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_eq_ignores_ids() {
        let mut a = Node::element("span");
        a.children_mut().unwrap().push(Node::text("hi"));
        let mut b = a.clone();
        b.set_id(Id(7));
        b.children_mut().unwrap()[0].set_id(Id(8));
        assert!(a.structurally_eq(&b));
    }

    #[test]
    fn structural_eq_spots_attribute_difference() {
        let a = Node::Element {
            id: Id::INVALID,
            name: "span".to_string(),
            ns: None,
            attributes: vec![Attribute::new("class", "a")],
            children: Vec::new(),
        };
        let b = Node::Element {
            id: Id::INVALID,
            name: "span".to_string(),
            ns: None,
            attributes: vec![Attribute::new("class", "b")],
            children: Vec::new(),
        };
        assert!(!a.structurally_eq(&b));
    }

    #[test]
    fn xlink_attribute_namespace_is_derived() {
        let attr = Attribute::new("xlink:href", "#a");
        assert_eq!(attr.ns, Some(Ns::XLink));
        assert_eq!(Attribute::new("href", "#a").ns, None);
    }
}
