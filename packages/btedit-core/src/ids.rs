use serde::{Deserialize, Serialize};

/// Structural revision of a tree. Every successful mutation advances it;
/// label maps remember the revision they were derived from.
pub type Generation = u64;

/// Handle for a node in a tree's arena.
///
/// Handles are allocated monotonically and never reused, so a handle stays
/// valid for the whole editing session even while its node is detached.
/// Handles are session-scoped and never appear in serialized documents.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u64);

/// Stable identity of a library-backed behavior, carried through documents.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistentId(pub String);

impl PersistentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersistentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
