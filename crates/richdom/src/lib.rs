//! Rich-text tree reconciliation.
//!
//! A `RichTextValue` (flat character buffer + per-character format stacks +
//! embedded replacements + optional selection) is turned into an owned tree
//! by `build_tree`, and an existing host tree is mutated in place to match a
//! newly built tree by `apply_value`. Node identity is reused wherever the
//! shape allows, so carets, composition state, and focus survive re-renders.

pub mod namespaces;
pub mod serializer;
#[cfg(any(test, feature = "tree-snapshot"))]
pub mod snapshot;
pub mod tree_utils;

mod tree_builder;
mod tree_patch;
mod types;
mod value;

pub use crate::namespaces::{Ns, namespace_for_attribute, namespace_for_tag};
pub use crate::serializer::{inner_html, to_html};
pub use crate::tree_builder::{BuildOptions, BuiltTree, build_tree};
pub use crate::tree_patch::{PatchStats, apply_value};
pub use crate::types::{Attribute, Id, Node, NodeId, TreePath};
pub use crate::value::{
    FormatDescriptor, LINE_SEPARATOR, OBJECT_REPLACEMENT_CHARACTER, ReplacementContent,
    ReplacementDescriptor, RichTextValue,
};
