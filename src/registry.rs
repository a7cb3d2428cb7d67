//! Node type registry
//!
//! The registry answers two lookups:
//!
//! - **record type → importer**: turns a structured record back into a payload
//! - **tag → conversion rules**: turns an element of an externally supplied
//!   tree (paste, drag and drop) into a payload
//!
//! # Rule resolution
//!
//! Several variants may claim the same tag. The rule with the numerically
//! highest priority wins; on a tie the rule registered first wins. Rules are
//! registered in variant registration order, then in the order a variant
//! lists them, so resolution is fully deterministic.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::convert::{SourceElement, SourceNode};
use crate::error::{DocError, DocResult};
use crate::id::NodeKey;
use crate::node::{NodeKind, NodeType};
use crate::nodes::{
    ContainerNode, ImageNode, LinkNode, RootNode, SentinelNode, TableCellNode, TableNode,
    TableRowNode, TextNode,
};
use crate::serialize::StructuredRecord;
use crate::tree::Transaction;

// =============================================================================
// Conversion rules
// =============================================================================

/// Outcome of a conversion rule for one source element
#[derive(Debug)]
pub enum Conversion {
    /// Attach this node; element-like nodes receive the source children
    Node(NodeKind),
    /// Drop the element itself, attach its children to the current parent
    Passthrough,
    /// Drop the element and everything under it
    Skip,
}

/// Conversion callback
pub type ConvertFn = fn(&SourceElement) -> Conversion;

/// `(tag, priority) -> conversion` rule declared by a variant
#[derive(Clone, Copy)]
pub struct DomConversion {
    /// Lower-case tag name the rule claims
    pub tag: &'static str,
    /// Higher wins
    pub priority: u32,
    /// Conversion callback
    pub convert: ConvertFn,
}

impl DomConversion {
    pub const fn new(tag: &'static str, priority: u32, convert: ConvertFn) -> Self {
        Self {
            tag,
            priority,
            convert,
        }
    }
}

impl std::fmt::Debug for DomConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomConversion")
            .field("tag", &self.tag)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// A registered rule: which variant declared it and when
#[derive(Debug, Clone, Copy)]
pub struct ConversionRule {
    /// Type discriminator of the declaring variant
    pub node_type: &'static str,
    /// The declared rule
    pub rule: DomConversion,
    /// Registration sequence number (tie-break)
    seq: usize,
}

impl ConversionRule {
    /// Whether this rule beats `other` for the same tag
    fn outranks(&self, other: &ConversionRule) -> bool {
        self.rule.priority > other.rule.priority
            || (self.rule.priority == other.rule.priority && self.seq < other.seq)
    }
}

/// Record importer
pub type ImportFn = fn(&StructuredRecord) -> DocResult<NodeKind>;

fn import_as<T: NodeType>(record: &StructuredRecord) -> DocResult<NodeKind> {
    T::import_record(record).map(NodeType::into_kind)
}

// =============================================================================
// Registry
// =============================================================================

/// Type registry: structured importers and DOM conversion rules
#[derive(Debug, Default, Clone)]
pub struct Registry {
    importers: FxHashMap<&'static str, ImportFn>,
    versions: FxHashMap<&'static str, u32>,
    rules: FxHashMap<CompactString, SmallVec<[ConversionRule; 2]>>,
    next_seq: usize,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in variant.
    ///
    /// Registration order (and thus tie-break order): root, text, container,
    /// table, table-row, table-cell, image, link, sentinel.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert_type::<RootNode>();
        registry.insert_type::<TextNode>();
        registry.insert_type::<ContainerNode>();
        registry.insert_type::<TableNode>();
        registry.insert_type::<TableRowNode>();
        registry.insert_type::<TableCellNode>();
        registry.insert_type::<ImageNode>();
        registry.insert_type::<LinkNode>();
        registry.insert_type::<SentinelNode>();
        registry
    }

    /// Register a variant: its importer and its conversion rules.
    ///
    /// Fails with `DuplicateType` if the discriminator is taken.
    pub fn register<T: NodeType>(&mut self) -> DocResult<&mut Self> {
        if self.importers.contains_key(T::TYPE) {
            return Err(DocError::DuplicateType(T::TYPE));
        }
        self.insert_type::<T>();
        Ok(self)
    }

    fn insert_type<T: NodeType>(&mut self) {
        self.importers.insert(T::TYPE, import_as::<T>);
        self.versions.insert(T::TYPE, T::VERSION);
        for &rule in T::conversions() {
            self.add_rule(T::TYPE, rule);
        }
    }

    /// Add a conversion rule on behalf of `node_type`.
    pub fn add_rule(&mut self, node_type: &'static str, rule: DomConversion) -> &mut Self {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rules
            .entry(CompactString::from(rule.tag.to_ascii_lowercase()))
            .or_default()
            .push(ConversionRule {
                node_type,
                rule,
                seq,
            });
        self
    }

    /// Check if a type discriminator is registered
    pub fn is_registered(&self, node_type: &str) -> bool {
        self.importers.contains_key(node_type)
    }

    /// Current record version of a registered type
    pub fn version_of(&self, node_type: &str) -> Option<u32> {
        self.versions.get(node_type).copied()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.importers.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structured records
    // ─────────────────────────────────────────────────────────────────────────

    /// Import one record's payload (children are not touched).
    pub fn import_record(&self, record: &StructuredRecord) -> DocResult<NodeKind> {
        let import = self
            .importers
            .get(record.node_type.as_str())
            .ok_or_else(|| DocError::UnknownType(record.node_type.clone()))?;
        import(record)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // DOM-origin reconstruction
    // ─────────────────────────────────────────────────────────────────────────

    /// Winning rule for a tag, if any variant claims it
    pub fn rule_for(&self, tag: &str) -> Option<&ConversionRule> {
        let rules = self.rules.get(tag.to_ascii_lowercase().as_str())?;
        rules
            .iter()
            .reduce(|best, rule| if rule.outranks(best) { rule } else { best })
    }

    /// Convert one element with its winning rule; `None` if unclaimed
    pub fn convert(&self, element: &SourceElement) -> Option<Conversion> {
        self.rule_for(&element.tag)
            .map(|rule| (rule.rule.convert)(element))
    }

    /// Rebuild typed nodes from an external tree under `parent`.
    ///
    /// Unclaimed elements pass their children through. Whitespace-only text
    /// is dropped. Block containers landing in a table cell are unwrapped:
    /// the cell keeps their content. Returns the keys attached directly
    /// under `parent`. Other structural violations propagate; nothing is
    /// coerced.
    pub fn reconstruct(
        &self,
        tx: &mut Transaction<'_>,
        parent: NodeKey,
        nodes: &[SourceNode],
    ) -> DocResult<Vec<NodeKey>> {
        let mut attached = Vec::new();
        // (target parent, remaining source siblings, attaches at top level)
        let mut stack = vec![(parent, nodes.iter(), true)];

        while let Some((target, siblings, top)) = stack.last_mut() {
            let (target, top) = (*target, *top);
            let Some(node) = siblings.next() else {
                stack.pop();
                continue;
            };

            let element = match node {
                SourceNode::Text(text) => {
                    if !text.trim().is_empty() {
                        let key = tx.append(target, TextNode::new(text.as_str()))?;
                        if top {
                            attached.push(key);
                        }
                    }
                    continue;
                }
                SourceNode::Element(element) => element,
            };

            match self.convert(element) {
                Some(Conversion::Node(kind)) if unwraps_in_cell(tx, target, &kind)? => {
                    tracing::debug!(tag = %element.tag, "block unwrapped inside table cell");
                    stack.push((target, element.children.iter(), top));
                }
                Some(Conversion::Node(kind)) => {
                    let descend = kind.is_element();
                    let key = tx.append(target, kind)?;
                    if top {
                        attached.push(key);
                    }
                    if descend {
                        stack.push((key, element.children.iter(), false));
                    }
                }
                Some(Conversion::Skip) => {
                    tracing::debug!(tag = %element.tag, "conversion rule skipped element");
                }
                Some(Conversion::Passthrough) | None => {
                    stack.push((target, element.children.iter(), top));
                }
            }
        }
        Ok(attached)
    }
}

/// Cells hold inline content only; a block container pasted into one gives
/// up its wrapper.
fn unwraps_in_cell(tx: &Transaction<'_>, parent: NodeKey, kind: &NodeKind) -> DocResult<bool> {
    if !matches!(kind, NodeKind::Container(_)) || kind.is_inline() {
        return Ok(false);
    }
    Ok(tx.node(parent)?.is::<TableCellNode>())
}
