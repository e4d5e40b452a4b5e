//! Plain-text tree layout in the style behavior-tree runtimes print their
//! status snapshots: one node per line, four-space indent per depth level,
//! a kind-specific bullet before each name.

use crate::ids::NodeId;
use crate::tree::{NodeKind, OrderingMode, Tree};

const INDENT: &str = "    ";

fn bullet(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Leaf => "-->",
        NodeKind::Composite(OrderingMode::Sequence) => "[-]",
        NodeKind::Composite(OrderingMode::Selector) => "[o]",
    }
}

/// One line per node of the subtree under `start`, in pre-order.
pub(crate) fn layout_lines(tree: &Tree, start: NodeId) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack = vec![(start, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if let Some(line) = node_line(tree, node, depth) {
            lines.push(line);
        }
        if let Some(children) = tree.children(node) {
            for child in children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
    }
    lines
}

/// Render the attached tree as newline-joined layout lines.
pub fn layout(tree: &Tree) -> String {
    layout_lines(tree, tree.root()).join("\n")
}

pub(crate) fn node_line(tree: &Tree, node: NodeId, depth: usize) -> Option<String> {
    let kind = tree.kind(node)?;
    let name = tree.name(node)?;
    Some(format!("{}{} {}", INDENT.repeat(depth), bullet(kind), name))
}

/// A placeholder line for an insertion point, rendered like a leaf whose
/// name is the slot's label in braces.
pub(crate) fn slot_line(label: &str, depth: usize) -> String {
    format!("{}--> {{{label}}}", INDENT.repeat(depth))
}

/// Prefix each layout line with a right-justified label column. Labels
/// beyond the last line (the append slot of a child-slot map) become bare
/// `label:` rows.
pub(crate) fn label_lines(labels: &[String], lines: &[String]) -> String {
    let width = labels.iter().map(|label| label.len()).max().unwrap_or(0);
    let mut rows = Vec::with_capacity(labels.len().max(lines.len()));
    for (i, label) in labels.iter().enumerate() {
        let line = lines.get(i).map(String::as_str).unwrap_or("");
        rows.push(format!("{label:>width$}: {line}").trim_end().to_string());
    }
    rows.join("\n")
}
