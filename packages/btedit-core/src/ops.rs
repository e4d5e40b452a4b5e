use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::PersistentId;

/// Identity of a node as seen at the moment a mutation touched it, shaped
/// like a childless document node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "id_", default, skip_serializing_if = "Option::is_none")]
    pub persistent_id: Option<PersistentId>,
}

/// The structural edits a session can apply.
///
/// `index` is the child position the node ended up at under `parent`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationKind {
    Remove {
        node: NodeSummary,
    },
    Insert {
        node: NodeSummary,
        parent: NodeSummary,
        index: usize,
    },
    Move {
        node: NodeSummary,
        parent: NodeSummary,
        index: usize,
    },
    Exchange {
        first: NodeSummary,
        second: NodeSummary,
    },
}

/// Record of one applied mutation, suitable for an append-only session log.
/// Serializes flat: `{"type": "move", ..., "time": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    #[serde(flatten)]
    pub kind: MutationKind,
    pub time: DateTime<Utc>,
}

impl Mutation {
    pub(crate) fn remove(node: NodeSummary) -> Self {
        Self::stamped(MutationKind::Remove { node })
    }

    pub(crate) fn insert(node: NodeSummary, parent: NodeSummary, index: usize) -> Self {
        Self::stamped(MutationKind::Insert {
            node,
            parent,
            index,
        })
    }

    pub(crate) fn move_node(node: NodeSummary, parent: NodeSummary, index: usize) -> Self {
        Self::stamped(MutationKind::Move {
            node,
            parent,
            index,
        })
    }

    pub(crate) fn exchange(first: NodeSummary, second: NodeSummary) -> Self {
        Self::stamped(MutationKind::Exchange { first, second })
    }

    fn stamped(kind: MutationKind) -> Self {
        Self {
            kind,
            time: Utc::now(),
        }
    }
}
