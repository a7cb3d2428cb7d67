//! Editor: owner of the canonical state
//!
//! All mutation goes through [`Editor::update`] (or [`Editor::try_update`]),
//! which hands a [`Transaction`] to a closure and commits its working set
//! afterwards. `update` takes `&mut self`, so transactions never interleave.
//!
//! # Commit rules
//!
//! | Method | Body returns `Ok` | Body returns `Err` |
//! |--------|-------------------|--------------------|
//! | `update` | commit | commit what was written, return the error |
//! | `try_update` | commit | discard everything, return the error |

use std::sync::Arc;

use crate::convert::parse_fragment;
use crate::error::DocResult;
use crate::id::NodeKey;
use crate::import::{ImportStats, MarkupImporter};
use crate::node::NodeType;
use crate::nodes::RootNode;
use crate::registry::Registry;
use crate::render::{RenderConfig, render_html};
use crate::serialize::StructuredRecord;

use super::transaction::Pending;
use super::{EditorState, Transaction};

// =============================================================================
// Editor
// =============================================================================

/// Owner of a document tree
#[derive(Debug, Clone)]
pub struct Editor {
    state: EditorState,
    registry: Arc<Registry>,
    version: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Empty document with the built-in node types
    pub fn new() -> Self {
        Self::with_registry(Arc::new(Registry::with_builtins()))
    }

    /// Empty document with a custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            state: EditorState::new(),
            registry,
            version: 0,
        }
    }

    /// Committed state
    #[inline]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Cheap snapshot of the committed state, unaffected by later commits
    pub fn snapshot(&self) -> EditorState {
        self.state.clone()
    }

    /// Key of the root node
    #[inline]
    pub fn root(&self) -> NodeKey {
        self.state.root()
    }

    /// Registry used for structured import and paste
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Number of commits that changed something
    pub fn version(&self) -> u64 {
        self.version
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `body` in a transaction and commit its working set.
    ///
    /// The working set is committed even if `body` fails; the error is
    /// returned after the commit. Use [`try_update`](Self::try_update) for
    /// all-or-nothing edits.
    pub fn update<R>(
        &mut self,
        body: impl FnOnce(&mut Transaction<'_>) -> DocResult<R>,
    ) -> DocResult<R> {
        let (result, pending) = self.run(body);
        self.commit(pending);
        result
    }

    /// Run `body` in a transaction; commit only if it succeeds.
    pub fn try_update<R>(
        &mut self,
        body: impl FnOnce(&mut Transaction<'_>) -> DocResult<R>,
    ) -> DocResult<R> {
        let (result, pending) = self.run(body);
        match result {
            Ok(value) => {
                self.commit(pending);
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(discarded = pending.len(), error = %err, "transaction discarded");
                Err(err)
            }
        }
    }

    fn run<R>(
        &self,
        body: impl FnOnce(&mut Transaction<'_>) -> DocResult<R>,
    ) -> (DocResult<R>, Pending) {
        let mut tx = Transaction::new(&self.state);
        let result = body(&mut tx);
        (result, tx.into_pending())
    }

    fn commit(&mut self, pending: Pending) {
        if pending.is_empty() {
            return;
        }
        let changed = pending.len();
        // Copies the arena only if a snapshot still holds it.
        let nodes = Arc::make_mut(&mut self.state.nodes);
        for (key, slot) in pending {
            match slot {
                Some(node) => {
                    nodes.insert(key, node);
                }
                None => {
                    nodes.remove(&key);
                }
            }
        }
        self.version += 1;
        tracing::debug!(version = self.version, changed, "committed transaction");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Import / export
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the document with imported markup (default importer).
    ///
    /// On failure the root is left cleared and the error is returned.
    pub fn import_markup(&mut self, raw: &str) -> DocResult<ImportStats> {
        self.import_markup_with(&MarkupImporter::new(), raw)
    }

    /// Replace the document with markup imported by `importer`.
    pub fn import_markup_with(
        &mut self,
        importer: &MarkupImporter,
        raw: &str,
    ) -> DocResult<ImportStats> {
        let root = self.root();
        self.update(|tx| importer.import(tx, root, raw))
    }

    /// Structured record of the whole document
    pub fn export(&self) -> DocResult<StructuredRecord> {
        self.state.export(self.root())
    }

    /// Replace the document with a structured record.
    ///
    /// A `root` record replaces the root's children with its own; any
    /// other record becomes the root's only child. All or nothing.
    pub fn load_structured(&mut self, record: &StructuredRecord) -> DocResult<()> {
        let registry = Arc::clone(&self.registry);
        let root = self.root();
        self.try_update(|tx| {
            tx.clear(root)?;
            if record.node_type == RootNode::TYPE {
                // Validates the root record's version
                registry.import_record(record)?;
                tx.import_records(&registry, root, record.children())?;
            } else {
                tx.import_records(&registry, root, std::slice::from_ref(record))?;
            }
            Ok(())
        })
    }

    /// Rebuild pasted markup under `parent` through the conversion rules.
    ///
    /// All or nothing: a structural violation leaves the tree unchanged.
    pub fn paste_html(&mut self, parent: NodeKey, html: &str) -> DocResult<Vec<NodeKey>> {
        let nodes = parse_fragment(html);
        let registry = Arc::clone(&self.registry);
        self.try_update(|tx| registry.reconstruct(tx, parent, &nodes))
    }

    /// Render the document content to HTML
    pub fn to_html(&self, config: &RenderConfig) -> String {
        render_html(&self.state, config)
    }
}
