//! The behavior library: the closed catalog of node templates a document
//! may reference. Documents resolve nodes against it by display name, and
//! the resolved entry is authoritative for the node's identity fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::PersistentId;

/// What a library template instantiates to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TemplateKind {
    Behavior,
    Sequence,
    Selector,
}

/// One catalog entry. `persistent_id` and `display_name` are each unique
/// within a library.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    #[serde(rename = "id")]
    pub persistent_id: PersistentId,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
}

impl LibraryEntry {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        kind: TemplateKind,
    ) -> Self {
        Self {
            persistent_id: PersistentId::new(id),
            display_name: display_name.into(),
            kind,
        }
    }
}

/// An immutable set of entries indexed by both persistent id and display
/// name.
#[derive(Clone, Debug)]
pub struct BehaviorLibrary {
    entries: Vec<LibraryEntry>,
    by_id: HashMap<PersistentId, usize>,
    by_display_name: HashMap<String, usize>,
}

impl BehaviorLibrary {
    /// Build the two indexes, rejecting duplicate keys of either kind.
    pub fn new(entries: Vec<LibraryEntry>) -> Result<Self> {
        let mut by_id = HashMap::new();
        let mut by_display_name = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            if by_id.insert(entry.persistent_id.clone(), index).is_some() {
                return Err(Error::MalformedDocument(format!(
                    "duplicate behavior id {}",
                    entry.persistent_id
                )));
            }
            if by_display_name
                .insert(entry.display_name.clone(), index)
                .is_some()
            {
                return Err(Error::MalformedDocument(format!(
                    "duplicate display name {:?}",
                    entry.display_name
                )));
            }
        }
        Ok(Self {
            entries,
            by_id,
            by_display_name,
        })
    }

    /// Parse a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<LibraryEntry> =
            serde_json::from_str(json).map_err(|err| Error::MalformedDocument(err.to_string()))?;
        Self::new(entries)
    }

    pub fn by_display_name(&self, name: &str) -> Option<&LibraryEntry> {
        self.by_display_name
            .get(name)
            .and_then(|index| self.entries.get(*index))
    }

    pub fn by_id(&self, id: &PersistentId) -> Option<&LibraryEntry> {
        self.by_id
            .get(id)
            .and_then(|index| self.entries.get(*index))
    }

    /// Look up by display name, turning a miss into the error a document
    /// or edit operation should surface.
    pub fn require_display_name(&self, name: &str) -> Result<&LibraryEntry> {
        self.by_display_name(name)
            .ok_or_else(|| Error::UnknownBehavior(name.to_string()))
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
