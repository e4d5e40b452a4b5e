use std::collections::{HashMap, HashSet};

use tracing::instrument;

use crate::error::{Error, Result};
use crate::ids::{Generation, NodeId, PersistentId};
use crate::library::{LibraryEntry, TemplateKind};
use crate::ops::{Mutation, NodeSummary};

/// How a composite schedules its children when a runtime eventually ticks
/// it. The editor never executes behaviors; the mode only affects rendering
/// and the `type` field of documents.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum OrderingMode {
    Sequence,
    Selector,
}

/// Structural kind of a node as seen by traversals and the serializer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeKind {
    Leaf,
    Composite(OrderingMode),
}

impl NodeKind {
    /// The `type` string used in documents and mutation records.
    pub fn type_name(self) -> &'static str {
        match self {
            NodeKind::Leaf => "Behavior",
            NodeKind::Composite(OrderingMode::Sequence) => "Sequence",
            NodeKind::Composite(OrderingMode::Selector) => "Selector",
        }
    }

    /// Inverse of [`NodeKind::type_name`]; `None` for unrecognized strings.
    pub fn from_type_name(name: &str) -> Option<NodeKind> {
        match name {
            "Behavior" => Some(NodeKind::Leaf),
            "Sequence" => Some(NodeKind::Composite(OrderingMode::Sequence)),
            "Selector" => Some(NodeKind::Composite(OrderingMode::Selector)),
            _ => None,
        }
    }
}

/// A leaf can never hold children; only the composite body owns a child list.
#[derive(Clone, Debug)]
enum NodeBody {
    Leaf,
    Composite {
        mode: OrderingMode,
        children: Vec<NodeId>,
    },
}

#[derive(Clone, Debug)]
struct NodeEntry {
    name: String,
    display_name: Option<String>,
    persistent_id: Option<PersistentId>,
    parent: Option<NodeId>,
    body: NodeBody,
}

impl NodeEntry {
    fn kind(&self) -> NodeKind {
        match &self.body {
            NodeBody::Leaf => NodeKind::Leaf,
            NodeBody::Composite { mode, .. } => NodeKind::Composite(*mode),
        }
    }

    fn summary(&self) -> NodeSummary {
        NodeSummary {
            node_type: self.kind().type_name().to_string(),
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            persistent_id: self.persistent_id.clone(),
        }
    }
}

const NO_CHILDREN: &[NodeId] = &[];

/// An editable behavior tree: an arena of nodes keyed by stable handles,
/// with a distinguished root and a generation counter that advances on every
/// structural change.
///
/// Detached subtrees (from [`Tree::remove`] or freshly created nodes) stay
/// resident in the arena so their handles remain usable; addressing, layout,
/// and serialization only ever walk from the root.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: HashMap<NodeId, NodeEntry>,
    root: NodeId,
    next_id: u64,
    generation: Generation,
}

impl Tree {
    /// Create a tree whose root is an empty composite.
    pub fn new(root_name: impl Into<String>, mode: OrderingMode) -> Self {
        Self::with_root_entry(NodeEntry {
            name: root_name.into(),
            display_name: None,
            persistent_id: None,
            parent: None,
            body: NodeBody::Composite {
                mode,
                children: Vec::new(),
            },
        })
    }

    /// A tree consisting of a single behavior. Degenerate but legal; it is
    /// what a document whose root is a lone leaf deserializes to.
    pub fn with_leaf_root(name: impl Into<String>) -> Self {
        Self::with_root_entry(NodeEntry {
            name: name.into(),
            display_name: None,
            persistent_id: None,
            parent: None,
            body: NodeBody::Leaf,
        })
    }

    pub(crate) fn with_root_node(
        name: String,
        kind: NodeKind,
        persistent_id: Option<PersistentId>,
        display_name: Option<String>,
    ) -> Self {
        Self::with_root_entry(NodeEntry {
            name,
            display_name,
            persistent_id,
            parent: None,
            body: Self::body_for(kind),
        })
    }

    fn with_root_entry(entry: NodeEntry) -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, entry);
        Self {
            nodes,
            root,
            next_id: 1,
            generation: 0,
        }
    }

    fn body_for(kind: NodeKind) -> NodeBody {
        match kind {
            NodeKind::Leaf => NodeBody::Leaf,
            NodeKind::Composite(mode) => NodeBody::Composite {
                mode,
                children: Vec::new(),
            },
        }
    }

    /// Create a fresh, detached leaf.
    pub fn create_leaf(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node(name.into(), NodeKind::Leaf, None, None)
    }

    /// Create a fresh, detached composite with no children.
    pub fn create_composite(&mut self, name: impl Into<String>, mode: OrderingMode) -> NodeId {
        self.create_node(name.into(), NodeKind::Composite(mode), None, None)
    }

    /// Create a detached node from a library entry. The node carries the
    /// entry's identity and is named by its display name.
    pub fn instantiate(&mut self, entry: &LibraryEntry) -> NodeId {
        let kind = match entry.kind {
            TemplateKind::Behavior => NodeKind::Leaf,
            TemplateKind::Sequence => NodeKind::Composite(OrderingMode::Sequence),
            TemplateKind::Selector => NodeKind::Composite(OrderingMode::Selector),
        };
        self.create_node(
            entry.display_name.clone(),
            kind,
            Some(entry.persistent_id.clone()),
            Some(entry.display_name.clone()),
        )
    }

    pub(crate) fn create_node(
        &mut self,
        name: String,
        kind: NodeKind,
        persistent_id: Option<PersistentId>,
        display_name: Option<String>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeEntry {
                name,
                display_name,
                persistent_id,
                parent: None,
                body: Self::body_for(kind),
            },
        );
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Revision of the tree's structure; see [`crate::LabelMap::resolve`].
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether the handle names a node in this tree's arena, attached or not.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|entry| entry.name.as_str())
    }

    pub fn display_name(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|entry| entry.display_name.as_deref())
    }

    pub fn persistent_id(&self, node: NodeId) -> Option<&PersistentId> {
        self.nodes
            .get(&node)
            .and_then(|entry| entry.persistent_id.as_ref())
    }

    /// Current parent of a node.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|entry| entry.parent)
    }

    /// Children of a node; a leaf reports an empty slice.
    pub fn children(&self, node: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(&node).map(|entry| match &entry.body {
            NodeBody::Composite { children, .. } => children.as_slice(),
            NodeBody::Leaf => NO_CHILDREN,
        })
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(&node).map(|entry| entry.kind())
    }

    pub fn is_composite(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Composite(_)))
    }

    /// Whether `node` is reachable from the root by parent links.
    pub fn is_attached(&self, node: NodeId) -> bool {
        if !self.contains(node) {
            return false;
        }
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes.get(&current).and_then(|entry| entry.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether `ancestor` lies strictly above `node` on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(&node).and_then(|entry| entry.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|entry| entry.parent);
        }
        false
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order traversal of the attached tree.
    pub fn iter(&self) -> PreOrder<'_> {
        self.subtree(self.root)
    }

    /// Pre-order traversal of the subtree under `start` (which may be a
    /// detached head).
    pub fn subtree(&self, start: NodeId) -> PreOrder<'_> {
        let stack = if self.nodes.contains_key(&start) {
            vec![start]
        } else {
            Vec::new()
        };
        PreOrder { tree: self, stack }
    }

    /// Detach `node` from its parent, leaving it in the arena as the root of
    /// its own subtree. The handle stays valid and the subtree can be
    /// re-attached with [`Tree::insert`].
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, node: NodeId) -> Result<Mutation> {
        let entry = self.entry(node)?;
        let parent = entry.parent.ok_or_else(|| {
            Error::IllegalOperation(format!("cannot remove {:?}: node has no parent", entry.name))
        })?;
        let summary = entry.summary();
        match self.nodes.get(&parent).map(|p| &p.body) {
            Some(NodeBody::Composite { .. }) => {}
            _ => {
                return Err(Error::IllegalOperation(format!(
                    "cannot remove {:?}: recorded parent is not a composite",
                    summary.name
                )))
            }
        }
        self.detach(node);
        self.generation += 1;
        Ok(Mutation::remove(summary))
    }

    /// Attach a detached node under `parent` at `index`, shifting later
    /// siblings right. `index == len(children)` appends.
    #[instrument(level = "debug", skip(self))]
    pub fn insert(&mut self, node: NodeId, parent: NodeId, index: usize) -> Result<Mutation> {
        let entry = self.entry(node)?;
        if node == self.root || entry.parent.is_some() {
            return Err(Error::IllegalOperation(format!(
                "cannot insert {:?}: node is already attached",
                entry.name
            )));
        }
        let node_summary = entry.summary();
        let dest = self.entry(parent)?;
        let len = match &dest.body {
            NodeBody::Composite { children, .. } => children.len(),
            NodeBody::Leaf => {
                return Err(Error::IllegalOperation(format!(
                    "cannot insert under {:?}: not a composite",
                    dest.name
                )))
            }
        };
        let parent_summary = dest.summary();
        if !self.is_attached(parent) {
            return Err(Error::IllegalOperation(format!(
                "cannot insert under {:?}: composite is not attached to the tree",
                parent_summary.name
            )));
        }
        if index > len {
            return Err(Error::IndexOutOfBounds(format!(
                "insert index {index} exceeds child count {len}"
            )));
        }
        self.attach(node, parent, index);
        self.generation += 1;
        Ok(Mutation::insert(node_summary, parent_summary, index))
    }

    /// Relocate `node` (with its whole subtree) under `parent` at `index`.
    /// Equivalent to a remove followed by an insert, validated up front so a
    /// rejected move leaves the tree untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&mut self, node: NodeId, parent: NodeId, index: usize) -> Result<Mutation> {
        let entry = self.entry(node)?;
        let current_parent = entry.parent.ok_or_else(|| {
            Error::IllegalOperation(format!("cannot move {:?}: node has no parent", entry.name))
        })?;
        let node_summary = entry.summary();
        let dest = self.entry(parent)?;
        let len = match &dest.body {
            NodeBody::Composite { children, .. } => children.len(),
            NodeBody::Leaf => {
                return Err(Error::IllegalOperation(format!(
                    "cannot move {:?} under {:?}: destination is not a composite",
                    node_summary.name, dest.name
                )))
            }
        };
        let parent_summary = dest.summary();
        if !self.is_attached(parent) {
            return Err(Error::IllegalOperation(format!(
                "cannot move under {:?}: composite is not attached to the tree",
                parent_summary.name
            )));
        }
        if parent == node || self.is_ancestor(node, parent) {
            return Err(Error::IllegalOperation(format!(
                "moving {:?} into its own subtree would create a cycle",
                node_summary.name
            )));
        }
        // Bounds are judged after the removal half: relocating within the
        // same parent shrinks the child list by one first.
        let limit = if current_parent == parent { len - 1 } else { len };
        if index > limit {
            return Err(Error::IndexOutOfBounds(format!(
                "move index {index} exceeds child count {limit}"
            )));
        }
        self.detach(node);
        self.attach(node, parent, index);
        self.generation += 1;
        Ok(Mutation::move_node(node_summary, parent_summary, index))
    }

    /// Swap the positions of two subtrees: both `(parent, index)` slots are
    /// captured first, then each node is moved into the other's old slot.
    /// Self-inverse. Pairs where one node is an ancestor of the other are
    /// rejected, since that swap has no well-defined result.
    #[instrument(level = "debug", skip(self))]
    pub fn exchange(&mut self, first: NodeId, second: NodeId) -> Result<Mutation> {
        let first_entry = self.entry(first)?;
        let first_parent = first_entry.parent.ok_or_else(|| {
            Error::IllegalOperation(format!(
                "cannot exchange {:?}: node has no parent",
                first_entry.name
            ))
        })?;
        let first_summary = first_entry.summary();
        let second_entry = self.entry(second)?;
        let second_parent = second_entry.parent.ok_or_else(|| {
            Error::IllegalOperation(format!(
                "cannot exchange {:?}: node has no parent",
                second_entry.name
            ))
        })?;
        let second_summary = second_entry.summary();
        if !self.is_attached(first) || !self.is_attached(second) {
            return Err(Error::IllegalOperation(
                "exchange requires both nodes attached to the tree".into(),
            ));
        }
        if self.is_ancestor(first, second) || self.is_ancestor(second, first) {
            return Err(Error::IllegalOperation(format!(
                "cannot exchange {:?} with {:?}: one is an ancestor of the other",
                first_summary.name, second_summary.name
            )));
        }
        let first_index = self.child_index(first_parent, first)?;
        let second_index = self.child_index(second_parent, second)?;
        self.detach(first);
        self.attach(first, second_parent, second_index);
        self.detach(second);
        self.attach(second, first_parent, first_index);
        self.generation += 1;
        Ok(Mutation::exchange(first_summary, second_summary))
    }

    /// Check the structural invariants: consistent parent pointers, no
    /// duplicate children, no cycles, every attached node reachable from the
    /// root exactly once. Intended for tests and debugging.
    pub fn validate_invariants(&self) -> Result<()> {
        match self.nodes.get(&self.root) {
            Some(root) if root.parent.is_none() => {}
            _ => {
                return Err(Error::IllegalOperation(
                    "root must exist and have no parent".into(),
                ))
            }
        }
        for (id, entry) in &self.nodes {
            if let NodeBody::Composite { children, .. } = &entry.body {
                let mut seen = HashSet::new();
                for child in children {
                    if !seen.insert(child) {
                        return Err(Error::IllegalOperation("duplicate child entry".into()));
                    }
                    match self.nodes.get(child) {
                        Some(child_entry) if child_entry.parent == Some(*id) => {}
                        Some(_) => {
                            return Err(Error::IllegalOperation("child parent mismatch".into()))
                        }
                        None => {
                            return Err(Error::IllegalOperation("child not present in arena".into()))
                        }
                    }
                }
            }
        }
        for id in self.nodes.keys() {
            if self.has_cycle_from(*id) {
                return Err(Error::IllegalOperation("cycle detected".into()));
            }
        }
        let mut visited = HashSet::new();
        for id in self.iter() {
            if !visited.insert(id) {
                return Err(Error::IllegalOperation(
                    "node reachable more than once".into(),
                ));
            }
        }
        Ok(())
    }

    fn has_cycle_from(&self, start: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if !visited.insert(id) {
                return true;
            }
            current = self.nodes.get(&id).and_then(|entry| entry.parent);
        }
        false
    }

    fn entry(&self, node: NodeId) -> Result<&NodeEntry> {
        self.nodes
            .get(&node)
            .ok_or_else(|| Error::IllegalOperation(format!("no node {node:?} in this tree")))
    }

    /// Position of `node` within `parent`'s children. The back-reference and
    /// the child list are kept consistent, so a miss means corruption.
    fn child_index(&self, parent: NodeId, node: NodeId) -> Result<usize> {
        self.children(parent)
            .and_then(|children| children.iter().position(|child| *child == node))
            .ok_or_else(|| {
                Error::IllegalOperation("child not present under its recorded parent".into())
            })
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get(&node).and_then(|entry| entry.parent);
        if let Some(parent) = parent {
            if let Some(NodeBody::Composite { children, .. }) =
                self.nodes.get_mut(&parent).map(|entry| &mut entry.body)
            {
                children.retain(|child| *child != node);
            }
        }
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.parent = None;
        }
    }

    fn attach(&mut self, node: NodeId, parent: NodeId, index: usize) {
        if let Some(NodeBody::Composite { children, .. }) =
            self.nodes.get_mut(&parent).map(|entry| &mut entry.body)
        {
            let index = index.min(children.len());
            children.insert(index, node);
        }
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.parent = Some(parent);
        }
    }
}

/// Depth-first pre-order traversal; children are visited left to right.
pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(children) = self.tree.children(id) {
            for child in children.iter().rev() {
                self.stack.push(*child);
            }
        }
        Some(id)
    }
}
