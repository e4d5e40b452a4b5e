//! JSON document form of a tree. Serialization walks the attached tree
//! into nested [`DocumentNode`] values; deserialization resolves every
//! node against a [`BehaviorLibrary`] before any tree is built, so a
//! malformed document never yields a tree, even transiently.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ids::{NodeId, PersistentId};
use crate::library::BehaviorLibrary;
use crate::tree::{NodeKind, Tree};

/// One node of the document form. `children` is omitted from the JSON when
/// empty, and leaves must not carry it at all.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "id_", default, skip_serializing_if = "Option::is_none")]
    pub persistent_id: Option<PersistentId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::MalformedDocument(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| Error::MalformedDocument(err.to_string()))
    }
}

/// Serialize the subtree under `node`.
pub fn serialize_node(tree: &Tree, node: NodeId) -> Result<DocumentNode> {
    let kind = tree
        .kind(node)
        .ok_or_else(|| Error::IllegalOperation(format!("no node {node:?} in this tree")))?;
    let mut children = Vec::new();
    if let Some(ids) = tree.children(node) {
        for child in ids {
            children.push(serialize_node(tree, *child)?);
        }
    }
    Ok(DocumentNode {
        node_type: kind.type_name().to_string(),
        name: tree.name(node).unwrap_or("").to_string(),
        display_name: tree.display_name(node).map(str::to_string),
        persistent_id: tree.persistent_id(node).cloned(),
        children,
    })
}

/// Serialize the attached tree from its root.
pub fn serialize_tree(tree: &Tree) -> Result<DocumentNode> {
    let doc = serialize_node(tree, tree.root())?;
    debug!(nodes = tree.node_count(), "serialized document");
    Ok(doc)
}

/// Build a tree from a document, resolving every node against the library.
///
/// Each node's `name` is the lookup key into the library's display-name
/// index. The resolved entry is authoritative: the node's name, display
/// name, and persistent id all come from the library; the document's own
/// `display_name` and `id_` are never consulted.
pub fn deserialize_tree(doc: &DocumentNode, library: &BehaviorLibrary) -> Result<Tree> {
    check_node(doc, library)?;
    let kind = node_kind(doc)?;
    let entry = library.require_display_name(&doc.name)?;
    let mut tree = Tree::with_root_node(
        entry.display_name.clone(),
        kind,
        Some(entry.persistent_id.clone()),
        Some(entry.display_name.clone()),
    );
    let root = tree.root();
    for child in &doc.children {
        build_node(&mut tree, root, child, library)?;
    }
    debug!(nodes = tree.node_count(), "deserialized document");
    Ok(tree)
}

fn node_kind(doc: &DocumentNode) -> Result<NodeKind> {
    let kind = NodeKind::from_type_name(&doc.node_type).ok_or_else(|| {
        Error::MalformedDocument(format!("unrecognized node type {:?}", doc.node_type))
    })?;
    if matches!(kind, NodeKind::Leaf) && !doc.children.is_empty() {
        return Err(Error::MalformedDocument(format!(
            "behavior {:?} must not have children",
            doc.name
        )));
    }
    Ok(kind)
}

// Error order matches a bottom-up build: a child's failure surfaces before
// its parent's lookup.
fn check_node(doc: &DocumentNode, library: &BehaviorLibrary) -> Result<()> {
    node_kind(doc)?;
    for child in &doc.children {
        check_node(child, library)?;
    }
    library.require_display_name(&doc.name)?;
    Ok(())
}

fn build_node(
    tree: &mut Tree,
    parent: NodeId,
    doc: &DocumentNode,
    library: &BehaviorLibrary,
) -> Result<()> {
    let kind = node_kind(doc)?;
    let entry = library.require_display_name(&doc.name)?;
    let node = tree.create_node(
        entry.display_name.clone(),
        kind,
        Some(entry.persistent_id.clone()),
        Some(entry.display_name.clone()),
    );
    let index = tree.children(parent).map(|c| c.len()).unwrap_or(0);
    tree.insert(node, parent, index)?;
    for child in &doc.children {
        build_node(tree, node, child, library)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_key_is_omitted_when_empty() {
        let doc = DocumentNode {
            node_type: "Behavior".to_string(),
            name: "Wave".to_string(),
            display_name: None,
            persistent_id: None,
            children: Vec::new(),
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"type":"Behavior","name":"Wave"}"#);
    }

    #[test]
    fn missing_children_key_parses_as_no_children() {
        let doc = DocumentNode::from_json(r#"{"type": "Sequence", "name": "S"}"#).unwrap();
        assert!(doc.children.is_empty());
        assert_eq!(doc.node_type, "Sequence");
    }

    #[test]
    fn identity_fields_use_their_wire_names() {
        let doc = DocumentNode::from_json(
            r#"{"type": "Behavior", "name": "Wave", "display_name": "Wave hello", "id_": "b-1"}"#,
        )
        .unwrap();
        assert_eq!(doc.display_name.as_deref(), Some("Wave hello"));
        assert_eq!(doc.persistent_id.as_ref().map(|id| id.as_str()), Some("b-1"));
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""id_":"b-1""#));
    }
}
