//! Behavior-tree editing engine: a handle-addressed tree model,
//! snapshot-scoped node and slot addressing, atomic structural mutations,
//! and library-backed JSON round-tripping.
//!
//! The tree never executes behaviors. It is the editable form a front end
//! mutates between runs: nodes are addressed through short-lived label
//! maps, every mutation either fully applies or leaves the tree untouched,
//! and documents resolve their identity through a [`BehaviorLibrary`].

#![forbid(unsafe_code)]

pub mod address;
pub mod document;
pub mod error;
pub mod ids;
pub mod library;
pub mod ops;
pub mod render;
pub mod session;
pub mod tree;

pub use address::{
    label_child_slots, label_composites, label_insertion_points, label_nodes, LabelMap, Slot,
};
pub use document::{deserialize_tree, serialize_node, serialize_tree, DocumentNode};
pub use error::{Error, Result};
pub use ids::{Generation, NodeId, PersistentId};
pub use library::{BehaviorLibrary, LibraryEntry, TemplateKind};
pub use ops::{Mutation, MutationKind, NodeSummary};
pub use render::layout;
pub use session::{EditSession, SessionRecord};
pub use tree::{NodeKind, OrderingMode, PreOrder, Tree};
