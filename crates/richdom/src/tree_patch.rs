//! In-place tree patching.
//!
//! Contract:
//! - Single-pass positional diff; children are compared index by index with
//!   no subsequence matching.
//! - Structurally equal children are left untouched (ids included).
//! - Text/text pairs are updated in place; the node keeps its identity.
//! - Element/element pairs with the same tag and namespace keep the current
//!   node: its attribute list is rebuilt in the future's order (removals,
//!   additions, and value rewrites counted individually), then children
//!   recurse.
//! - A kind, tag, or namespace mismatch replaces the current child with the
//!   already-built future child; no attribute transfer is attempted on a tag
//!   change. This is the documented policy, not an optimization. The
//!   discarded current child counts as removed.
//! - Future children past the current count are appended (the future node is
//!   relocated, never rebuilt); current children past the future count are
//!   detached and discarded.
//! - `PatchStats::moved` counts exactly the future nodes relocated into the
//!   current tree. Attribute-only and text-only diffs never increment it.
//! - The root passed to `apply_value` keeps its identity unconditionally; a
//!   root kind mismatch is a caller contract violation.
//! - Patching twice with the same future value reports all-zero stats on the
//!   second call.

use crate::types::{Attribute, Node};

/// Structural change accounting for one `apply_value` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Future nodes relocated into the current tree (appended or substituted).
    pub moved: usize,
    /// Current nodes detached and discarded.
    pub removed: usize,
    /// Text nodes whose content was rewritten in place.
    pub text_updates: usize,
    /// Individual attribute removals, additions, and value rewrites.
    pub attribute_updates: usize,
}

impl PatchStats {
    pub fn is_noop(&self) -> bool {
        *self == PatchStats::default()
    }
}

/// Mutate `current` in place until it is structurally identical to `future`,
/// consuming `future` and reusing its nodes wherever the current tree has no
/// matching counterpart. `current` itself keeps its identity for external
/// holders (selection restoration, focus bookkeeping).
pub fn apply_value(future: Node, current: &mut Node) -> PatchStats {
    let mut stats = PatchStats::default();
    match (current, future) {
        (
            Node::Element {
                attributes,
                children,
                ..
            },
            Node::Element {
                attributes: future_attributes,
                children: future_children,
                ..
            },
        ) => {
            reconcile_attributes(attributes, future_attributes, &mut stats);
            reconcile_children(children, future_children, &mut stats);
        }
        (
            Node::Text { text, .. },
            Node::Text {
                text: future_text, ..
            },
        ) => {
            if *text != future_text {
                *text = future_text;
                stats.text_updates += 1;
            }
        }
        _ => {
            debug_assert!(false, "apply_value roots must be of the same kind");
        }
    }
    stats
}

fn reconcile_children(current: &mut Vec<Node>, future: Vec<Node>, stats: &mut PatchStats) {
    let future_len = future.len();
    for (i, future_child) in future.into_iter().enumerate() {
        let Some(current_child) = current.get_mut(i) else {
            log::trace!(target: "richdom.patch", "append child at index {i}");
            stats.moved += 1;
            current.push(future_child);
            continue;
        };

        if current_child.structurally_eq(&future_child) {
            continue;
        }

        if !same_shape(current_child, &future_child) {
            log::trace!(target: "richdom.patch", "replace child at index {i}");
            *current_child = future_child;
            stats.moved += 1;
            stats.removed += 1;
            continue;
        }

        match (current_child, future_child) {
            (
                Node::Text { text, .. },
                Node::Text {
                    text: future_text, ..
                },
            ) => {
                if *text != future_text {
                    *text = future_text;
                    stats.text_updates += 1;
                }
            }
            (
                Node::Element {
                    attributes,
                    children,
                    ..
                },
                Node::Element {
                    attributes: future_attributes,
                    children: future_children,
                    ..
                },
            ) => {
                reconcile_attributes(attributes, future_attributes, stats);
                reconcile_children(children, future_children, stats);
            }
            _ => unreachable!("same_shape guarantees matching node kinds"),
        }
    }

    if current.len() > future_len {
        let excess = current.len() - future_len;
        log::trace!(target: "richdom.patch", "remove {excess} trailing children");
        stats.removed += excess;
        current.truncate(future_len);
    }
}

/// True when the current node can absorb the future node in place: same kind,
/// and for elements the same tag and namespace.
fn same_shape(current: &Node, future: &Node) -> bool {
    match (current, future) {
        (Node::Text { .. }, Node::Text { .. }) => true,
        (
            Node::Element { name, ns, .. },
            Node::Element {
                name: future_name,
                ns: future_ns,
                ..
            },
        ) => name == future_name && ns == future_ns,
        _ => false,
    }
}

fn reconcile_attributes(
    current: &mut Vec<Attribute>,
    future: Vec<Attribute>,
    stats: &mut PatchStats,
) {
    if *current == future {
        return;
    }

    stats.attribute_updates += current
        .iter()
        .filter(|attribute| !future.iter().any(|f| f.name == attribute.name))
        .count();

    // The rebuilt list takes the future's order; a name kept from the current
    // list counts as an update only when its value changed.
    let previous = std::mem::take(current);
    current.reserve(future.len());
    for future_attribute in future {
        let unchanged = previous.iter().any(|attribute| {
            attribute.name == future_attribute.name && attribute.value == future_attribute.value
        });
        if !unchanged {
            stats.attribute_updates += 1;
        }
        current.push(future_attribute);
    }
}
