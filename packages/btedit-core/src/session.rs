//! An editing session wraps a tree, the library it was resolved against,
//! and an append-only log of every applied mutation. The session can
//! produce a [`SessionRecord`] pairing the starting document with the log
//! and the final document, which is what a front end persists.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::document::{deserialize_tree, serialize_tree, DocumentNode};
use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::library::BehaviorLibrary;
use crate::ops::Mutation;
use crate::tree::Tree;

#[derive(Debug)]
pub struct EditSession {
    id: Uuid,
    tree: Tree,
    library: BehaviorLibrary,
    base: DocumentNode,
    log: Vec<Mutation>,
    started_at: DateTime<Utc>,
}

impl EditSession {
    /// Start a session over an already-built tree. The base document is
    /// captured immediately, before any edits.
    pub fn new(tree: Tree, library: BehaviorLibrary) -> Result<Self> {
        let base = serialize_tree(&tree)?;
        let session = Self {
            id: Uuid::new_v4(),
            tree,
            library,
            base,
            log: Vec::new(),
            started_at: Utc::now(),
        };
        info!(session = %session.id, "edit session started");
        Ok(session)
    }

    /// Start a session from a document, deserializing it against `library`.
    pub fn load(doc: &DocumentNode, library: BehaviorLibrary) -> Result<Self> {
        let tree = deserialize_tree(doc, &library)?;
        Self::new(tree, library)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn library(&self) -> &BehaviorLibrary {
        &self.library
    }

    /// Mutations applied so far, oldest first. Rejected operations never
    /// appear here.
    pub fn log(&self) -> &[Mutation] {
        &self.log
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn remove(&mut self, node: NodeId) -> Result<Mutation> {
        let record = self.tree.remove(node)?;
        self.log.push(record.clone());
        Ok(record)
    }

    pub fn insert(&mut self, node: NodeId, parent: NodeId, index: usize) -> Result<Mutation> {
        let record = self.tree.insert(node, parent, index)?;
        self.log.push(record.clone());
        Ok(record)
    }

    pub fn move_node(&mut self, node: NodeId, parent: NodeId, index: usize) -> Result<Mutation> {
        let record = self.tree.move_node(node, parent, index)?;
        self.log.push(record.clone());
        Ok(record)
    }

    pub fn exchange(&mut self, first: NodeId, second: NodeId) -> Result<Mutation> {
        let record = self.tree.exchange(first, second)?;
        self.log.push(record.clone());
        Ok(record)
    }

    /// Create a detached node from the library entry with this display
    /// name, ready to be passed to [`EditSession::insert`].
    pub fn instantiate(&mut self, name: &str) -> Result<NodeId> {
        let entry = self.library.require_display_name(name)?.clone();
        Ok(self.tree.instantiate(&entry))
    }

    /// Snapshot the session: base document, mutation log, final document.
    pub fn record(&self) -> Result<SessionRecord> {
        Ok(SessionRecord {
            session_id: self.id,
            started_at: self.started_at,
            base_tree: self.base.clone(),
            log: self.log.clone(),
            final_tree: serialize_tree(&self.tree)?,
        })
    }
}

/// The persistable outcome of a session.
#[derive(Clone, Debug, Serialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub base_tree: DocumentNode,
    pub log: Vec<Mutation>,
    pub final_tree: DocumentNode,
}

impl SessionRecord {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| Error::MalformedDocument(err.to_string()))
    }
}
