//! Snapshot-scoped addressing. Each labeling pass walks the current tree,
//! hands out string labels tied to the tree's generation, and renders a
//! text listing a caller can show verbatim. A map issued before a mutation
//! refuses to resolve afterward, so a label can never silently land on a
//! node that moved.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ids::{Generation, NodeId};
use crate::render::{label_lines, layout_lines, node_line, slot_line};
use crate::tree::Tree;

/// Column marker for lines that exist in the listing but take no label.
const SKIP_LABEL: &str = "_";

/// An insertion point: position `index` in `composite`'s child list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Slot {
    pub composite: NodeId,
    pub index: usize,
}

/// Labels issued against one revision of one tree.
///
/// The type parameter is what a label resolves to: a [`NodeId`] for node
/// maps, a child index for slot maps, a [`Slot`] for insertion-point maps.
#[derive(Clone, Debug)]
pub struct LabelMap<A> {
    entries: HashMap<String, A>,
    labels: Vec<String>,
    text: String,
    generation: Generation,
}

impl<A: Copy> LabelMap<A> {
    /// Look up a label, refusing both unknown labels and maps that predate
    /// the tree's current generation.
    pub fn resolve(&self, tree: &Tree, label: &str) -> Result<A> {
        if self.generation != tree.generation() {
            return Err(Error::UnknownAddress(format!(
                "label {label:?} was issued against an earlier revision of the tree"
            )));
        }
        self.entries
            .get(label)
            .copied()
            .ok_or_else(|| Error::UnknownAddress(format!("label {label:?} is not selectable here")))
    }

    /// The labels this map hands out, in the order they appear in the text.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The rendered listing the labels refer to.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Label every attached node by its pre-order position.
pub fn label_nodes(tree: &Tree) -> LabelMap<NodeId> {
    let mut entries = HashMap::new();
    let mut labels = Vec::new();
    for (i, node) in tree.iter().enumerate() {
        let label = i.to_string();
        entries.insert(label.clone(), node);
        labels.push(label);
    }
    let lines = layout_lines(tree, tree.root());
    let text = label_lines(&labels, &lines);
    LabelMap {
        entries,
        labels,
        text,
        generation: tree.generation(),
    }
}

/// Label only composites, keeping the same pre-order numbering as
/// [`label_nodes`]; leaf rows show a skip marker and stay unselectable.
pub fn label_composites(tree: &Tree) -> LabelMap<NodeId> {
    let mut entries = HashMap::new();
    let mut labels = Vec::new();
    let mut column = Vec::new();
    for (i, node) in tree.iter().enumerate() {
        if tree.is_composite(node) {
            let label = i.to_string();
            entries.insert(label.clone(), node);
            labels.push(label.clone());
            column.push(label);
        } else {
            column.push(SKIP_LABEL.to_string());
        }
    }
    let lines = layout_lines(tree, tree.root());
    let text = label_lines(&column, &lines);
    LabelMap {
        entries,
        labels,
        text,
        generation: tree.generation(),
    }
}

/// Label the direct child positions of one composite, `0..=len(children)`.
/// The final label is the append slot and renders as a bare trailing row;
/// descendant rows that are not direct children show the skip marker.
pub fn label_child_slots(tree: &Tree, composite: NodeId) -> Result<LabelMap<usize>> {
    let children = match tree.children(composite) {
        Some(children) if tree.is_composite(composite) => children,
        Some(_) => {
            return Err(Error::IllegalOperation(format!(
                "cannot list child slots of {:?}: not a composite",
                tree.name(composite).unwrap_or("")
            )))
        }
        None => {
            return Err(Error::IllegalOperation(format!(
                "no node {composite:?} in this tree"
            )))
        }
    };
    let slot_of: HashMap<NodeId, usize> = children
        .iter()
        .enumerate()
        .map(|(index, child)| (*child, index))
        .collect();
    let mut entries = HashMap::new();
    let mut labels = Vec::new();
    let mut column = Vec::new();
    for node in tree.subtree(composite) {
        match slot_of.get(&node) {
            Some(index) => {
                let label = index.to_string();
                entries.insert(label.clone(), *index);
                labels.push(label.clone());
                column.push(label);
            }
            None => column.push(SKIP_LABEL.to_string()),
        }
    }
    let append = children.len();
    let label = append.to_string();
    entries.insert(label.clone(), append);
    labels.push(label.clone());
    column.push(label);
    let lines = layout_lines(tree, composite);
    let text = label_lines(&column, &lines);
    Ok(LabelMap {
        entries,
        labels,
        text,
        generation: tree.generation(),
    })
}

/// Label every insertion point in the tree. The listing interleaves node
/// lines with placeholder rows, one per gap: before each composite's first
/// child, between siblings, and after the last child. An empty composite
/// contributes exactly one point.
pub fn label_insertion_points(tree: &Tree) -> LabelMap<Slot> {
    let mut entries = HashMap::new();
    let mut labels = Vec::new();
    let mut lines = Vec::new();
    walk_slots(
        tree,
        tree.root(),
        0,
        &mut entries,
        &mut labels,
        &mut lines,
    );
    let text = lines.join("\n");
    LabelMap {
        entries,
        labels,
        text,
        generation: tree.generation(),
    }
}

fn walk_slots(
    tree: &Tree,
    node: NodeId,
    depth: usize,
    entries: &mut HashMap<String, Slot>,
    labels: &mut Vec<String>,
    lines: &mut Vec<String>,
) {
    if let Some(line) = node_line(tree, node, depth) {
        lines.push(line);
    }
    if !tree.is_composite(node) {
        return;
    }
    push_slot(entries, labels, lines, node, 0, depth + 1);
    if let Some(children) = tree.children(node) {
        for (i, child) in children.iter().enumerate() {
            walk_slots(tree, *child, depth + 1, entries, labels, lines);
            push_slot(entries, labels, lines, node, i + 1, depth + 1);
        }
    }
}

fn push_slot(
    entries: &mut HashMap<String, Slot>,
    labels: &mut Vec<String>,
    lines: &mut Vec<String>,
    composite: NodeId,
    index: usize,
    depth: usize,
) {
    let label = labels.len().to_string();
    lines.push(slot_line(&label, depth));
    entries.insert(label.clone(), Slot { composite, index });
    labels.push(label);
}
