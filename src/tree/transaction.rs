//! Copy-on-write working set
//!
//! A [`Transaction`] reads through to the committed [`EditorState`] and
//! records every change in an overlay:
//!
//! ```text
//! pending: key → Some(node)   written or created
//!          key → None         removed
//! ```
//!
//! The first write to a committed node copies its `Arc` into the overlay;
//! `Arc::make_mut` then clones the node (same key) only if a snapshot or a
//! savepoint still shares it.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{DocError, DocResult};
use crate::id::NodeKey;
use crate::node::{Node, NodeKind, NodeType};
use crate::registry::Registry;
use crate::serialize::{self, StructuredRecord};

use super::EditorState;

/// Overlay of changes against the committed state.
pub(crate) type Pending = FxHashMap<NodeKey, Option<Arc<Node>>>;

// =============================================================================
// Transaction
// =============================================================================

/// Mutable working set over a committed state
pub struct Transaction<'a> {
    base: &'a EditorState,
    pending: Pending,
}

/// Snapshot of a transaction's working set, see [`Transaction::savepoint`]
#[derive(Debug, Clone)]
pub struct Savepoint {
    pending: Pending,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(base: &'a EditorState) -> Self {
        Self {
            base,
            pending: Pending::default(),
        }
    }

    /// Key of the root node
    pub fn root(&self) -> NodeKey {
        self.base.root()
    }

    /// Committed state this transaction started from
    pub fn base(&self) -> &'a EditorState {
        self.base
    }

    /// Number of nodes written, created or removed so far
    pub fn touched(&self) -> usize {
        self.pending.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Latest version of a node, as seen from inside this transaction
    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        match self.pending.get(&key) {
            Some(slot) => slot.as_deref(),
            None => self.base.get(key),
        }
    }

    /// Latest version of a node, failing with `MissingNode`
    pub fn node(&self, key: NodeKey) -> DocResult<&Node> {
        self.get(key).ok_or(DocError::MissingNode(key))
    }

    /// Child keys as seen from inside this transaction
    pub fn children_of(&self, key: NodeKey) -> &[NodeKey] {
        self.get(key).map(Node::children).unwrap_or_default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Writable version of a node, copied on first touch if shared.
    pub fn get_writable(&mut self, key: NodeKey) -> DocResult<&mut Node> {
        let base = self.base;
        let slot = match self.pending.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let node = base.nodes.get(&key).ok_or(DocError::MissingNode(key))?;
                entry.insert(Some(Arc::clone(node)))
            }
        };
        match slot {
            Some(node) => Ok(Arc::make_mut(node)),
            None => Err(DocError::MissingNode(key)),
        }
    }

    /// Typed writable payload; fails with `TypeMismatch` on another variant
    pub fn write<T: NodeType>(&mut self, key: NodeKey) -> DocResult<&mut T> {
        self.node(key)?.try_get::<T>()?;
        let node = self.get_writable(key)?;
        let found = node.type_name();
        node.get_mut::<T>().ok_or(DocError::TypeMismatch {
            expected: T::TYPE,
            found,
        })
    }

    /// Create a node as the last child of `parent`.
    ///
    /// Fails with `StructuralViolation` if `parent` does not accept it.
    pub fn append(&mut self, parent: NodeKey, payload: impl Into<NodeKind>) -> DocResult<NodeKey> {
        let mut kind = payload.into();
        self.node(parent)?.kind().check_child(&kind)?;

        // A payload copied from another node must not bring its child list.
        if let Some(element) = kind.as_element_mut() {
            element.children_mut().clear();
        }

        let mut node = Node::new(kind);
        node.set_parent(Some(parent));
        let key = node.key();

        self.children_mut(parent)?.push(key);
        self.pending.insert(key, Some(Arc::new(node)));
        Ok(key)
    }

    /// Detach and remove the subtree rooted at `key`.
    pub fn remove(&mut self, key: NodeKey) -> DocResult<()> {
        let parent = self.node(key)?.parent().ok_or_else(|| {
            DocError::StructuralViolation("the root node cannot be removed".to_string())
        })?;
        self.children_mut(parent)?.retain(|child| *child != key);
        self.drop_subtree(key);
        Ok(())
    }

    /// Remove every child subtree of `key`.
    pub fn clear(&mut self, key: NodeKey) -> DocResult<()> {
        let children: Vec<NodeKey> = self.node(key)?.children().to_vec();
        self.children_mut(key)?.clear();
        for child in children {
            self.drop_subtree(child);
        }
        Ok(())
    }

    fn children_mut(&mut self, key: NodeKey) -> DocResult<&mut crate::node::Children> {
        let node = self.get_writable(key)?;
        let describe = node.kind().describe();
        node.kind_mut()
            .as_element_mut()
            .map(|element| element.children_mut())
            .ok_or_else(|| DocError::StructuralViolation(format!("`{describe}` has no children")))
    }

    fn drop_subtree(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.get(key) {
                stack.extend_from_slice(node.children());
            }
            self.pending.insert(key, None);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Savepoints
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the current working set.
    ///
    /// Nodes stay shared with the savepoint, so later writes copy them.
    pub fn savepoint(&self) -> Savepoint {
        Savepoint {
            pending: self.pending.clone(),
        }
    }

    /// Throw away every change made after `savepoint` was taken.
    pub fn rollback_to(&mut self, savepoint: Savepoint) {
        tracing::debug!(
            discarded = self.pending.len().saturating_sub(savepoint.pending.len()),
            "rolled back to savepoint"
        );
        self.pending = savepoint.pending;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structured import
    // ─────────────────────────────────────────────────────────────────────────

    /// Import records (with their subtrees) as children of `parent`.
    pub fn import_records(
        &mut self,
        registry: &Registry,
        parent: NodeKey,
        records: &[StructuredRecord],
    ) -> DocResult<Vec<NodeKey>> {
        records
            .iter()
            .map(|record| serialize::import_record(self, registry, parent, record))
            .collect()
    }

    pub(crate) fn into_pending(self) -> Pending {
        self.pending
    }
}
