//! Committed document state
//!
//! An [`EditorState`] is an immutable arena of `Arc<Node>` keyed by
//! [`NodeKey`]. Cloning it is a reference-count bump; a clone is a
//! snapshot that later commits never touch.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{DocError, DocResult};
use crate::hash;
use crate::id::NodeKey;
use crate::node::{Node, NodeKind, NodeType};
use crate::nodes::RootNode;
use crate::serialize::{self, StructuredRecord};

/// Node arena shared between the editor and its snapshots.
pub(crate) type NodeMap = FxHashMap<NodeKey, Arc<Node>>;

// =============================================================================
// EditorState
// =============================================================================

/// Committed, read-only view of a document tree
#[derive(Debug, Clone)]
pub struct EditorState {
    pub(crate) nodes: Arc<NodeMap>,
    root: NodeKey,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// State holding an empty root
    pub fn new() -> Self {
        let root = Node::new(RootNode::default());
        let key = root.key();
        let mut nodes = NodeMap::default();
        nodes.insert(key, Arc::new(root));
        Self {
            nodes: Arc::new(nodes),
            root: key,
        }
    }

    /// Key of the root node
    #[inline]
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Look up a node
    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(&key).map(Arc::as_ref)
    }

    /// Look up a node, failing with `MissingNode`
    pub fn node(&self, key: NodeKey) -> DocResult<&Node> {
        self.get(key).ok_or(DocError::MissingNode(key))
    }

    /// Check if a key is part of the tree
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is always present
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child keys of `key` in order; empty for leaves and unknown keys
    pub fn children_of(&self, key: NodeKey) -> &[NodeKey] {
        self.get(key).map(Node::children).unwrap_or_default()
    }

    /// Parent of `key`
    pub fn parent_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.get(key).and_then(Node::parent)
    }

    /// Whether two states share the same arena allocation
    pub fn ptr_eq(&self, other: &EditorState) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Traversal
    // ─────────────────────────────────────────────────────────────────────────

    /// Nodes of the subtree at `key` (inclusive), depth-first in document order
    pub fn descendants(&self, key: NodeKey) -> Descendants<'_> {
        Descendants {
            state: self,
            stack: vec![key],
        }
    }

    /// Keys of all `T` nodes under `key` (inclusive), in document order
    pub fn find_all<T: NodeType>(&self, key: NodeKey) -> Vec<NodeKey> {
        self.descendants(key)
            .filter(|node| node.is::<T>())
            .map(Node::key)
            .collect()
    }

    /// Visible text of the subtree at `key`: text runs and link labels
    pub fn text_content(&self, key: NodeKey) -> String {
        let mut text = String::new();
        for node in self.descendants(key) {
            match node.kind() {
                NodeKind::Text(t) => text.push_str(&t.text),
                NodeKind::Link(l) => text.push_str(&l.text),
                _ => {}
            }
        }
        text
    }

    /// Collect statistics about the whole tree
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.collect_stats(self.root, 0, &mut stats);
        stats
    }

    fn collect_stats(&self, key: NodeKey, depth: usize, stats: &mut TreeStats) {
        let Some(node) = self.get(key) else {
            return;
        };
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);
        let kind = node.kind();
        if kind.is_element() {
            stats.elements += 1;
        } else if kind.is_decorator() {
            stats.decorators += 1;
        } else {
            stats.texts += 1;
        }
        for &child in node.children() {
            self.collect_stats(child, depth + 1, stats);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────

    /// Structured record of the subtree at `key`
    pub fn export(&self, key: NodeKey) -> DocResult<StructuredRecord> {
        serialize::export_node(self, key)
    }

    /// Content fingerprint of the subtree at `key`.
    ///
    /// Keys do not take part: two trees with the same structured export
    /// share a fingerprint.
    pub fn fingerprint(&self, key: NodeKey) -> DocResult<u64> {
        let json = serialize::to_json(&self.export(key)?)?;
        Ok(hash::fingerprint(json.as_bytes()))
    }
}

// =============================================================================
// Descendants - depth-first node traversal
// =============================================================================

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    state: &'a EditorState,
    stack: Vec<NodeKey>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(key) = self.stack.pop() {
            if let Some(node) = self.state.get(key) {
                // Reverse so children come out left-to-right
                self.stack.extend(node.children().iter().rev().copied());
                return Some(node);
            }
        }
        None
    }
}

// =============================================================================
// TreeStats
// =============================================================================

/// Node counts of a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// All nodes, root included
    pub nodes: usize,
    /// Children-capable nodes
    pub elements: usize,
    /// Text leaves
    pub texts: usize,
    /// Opaque leaves
    pub decorators: usize,
    /// Deepest level below the root
    pub max_depth: usize,
}

impl TreeStats {
    /// Leaves of any kind
    pub fn leaves(&self) -> usize {
        self.texts + self.decorators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ContainerNode, LinkNode, TextNode};
    use crate::tree::Editor;

    #[test]
    fn test_new_state_has_root() {
        let state = EditorState::new();
        assert_eq!(state.len(), 1);
        assert!(state.node(state.root()).is_ok_and(|n| n.is::<RootNode>()));
        assert!(state.children_of(state.root()).is_empty());
        assert!(matches!(
            state.node(NodeKey::next()),
            Err(DocError::MissingNode(_))
        ));
    }

    #[test]
    fn test_traversal_order_and_text() -> DocResult<()> {
        let mut editor = Editor::new();
        let root = editor.root();
        editor.update(|tx| {
            let p = tx.append(root, ContainerNode::new("p"))?;
            tx.append(p, TextNode::new("see "))?;
            tx.append(p, LinkNode::new("/docs", "docs"))?;
            let q = tx.append(root, ContainerNode::new("p"))?;
            tx.append(q, TextNode::new("!"))?;
            Ok(())
        })?;

        let state = editor.state();
        assert_eq!(state.text_content(root), "see docs!");
        assert_eq!(state.find_all::<ContainerNode>(root).len(), 2);

        let stats = state.stats();
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.elements, 3);
        assert_eq!(stats.leaves(), 3);
        assert_eq!(stats.max_depth, 2);
        Ok(())
    }

    #[test]
    fn test_fingerprint_ignores_keys() -> DocResult<()> {
        let build = || -> DocResult<EditorState> {
            let mut editor = Editor::new();
            let root = editor.root();
            editor.update(|tx| {
                let p = tx.append(root, ContainerNode::new("p"))?;
                tx.append(p, TextNode::new("same"))
            })?;
            Ok(editor.snapshot())
        };
        let (a, b) = (build()?, build()?);
        assert_ne!(a.root(), b.root());
        assert_eq!(a.fingerprint(a.root())?, b.fingerprint(b.root())?);
        Ok(())
    }
}
