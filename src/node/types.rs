//! Node and its payload sum type
//!
//! [`NodeKind`] is the explicit discriminated union of all variants; code
//! branches on it (or on [`NodeType::TYPE`]) and never on runtime type
//! identity. [`Node`] wraps a payload with its key and parent link.

use crate::error::{DocError, DocResult};
use crate::id::NodeKey;
use crate::nodes::{
    ContainerNode, ImageNode, LinkNode, RootNode, SentinelNode, TableCellNode, TableNode,
    TableRowNode, TextNode,
};
use crate::render::{Decoration, SurfaceFactory};
use crate::serialize::RecordFields;

use super::{Decorator, ElementLike, NodeType};

// =============================================================================
// NodeKind - Sum type
// =============================================================================

/// Payload of a node, one variant per node type
#[derive(Debug, Clone)]
pub enum NodeKind {
    Root(RootNode),
    Text(TextNode),
    Container(ContainerNode),
    Table(TableNode),
    TableRow(TableRowNode),
    TableCell(TableCellNode),
    Image(ImageNode),
    Link(LinkNode),
    Sentinel(SentinelNode),
}

impl_kind_from!(
    Root => RootNode,
    Text => TextNode,
    Container => ContainerNode,
    Table => TableNode,
    TableRow => TableRowNode,
    TableCell => TableCellNode,
    Image => ImageNode,
    Link => LinkNode,
    Sentinel => SentinelNode,
);

fn type_of<T: NodeType>(_: &T) -> &'static str {
    T::TYPE
}

fn version_of<T: NodeType>(_: &T) -> u32 {
    T::VERSION
}

impl NodeKind {
    // Generates for each variant (TableRow -> table_row, etc.):
    //   - is_xxx(&self) -> bool
    //   - as_xxx(&self) -> Option<&Payload>
    //   - as_xxx_mut(&mut self) -> Option<&mut Payload>
    impl_kind_accessors!(
        Root => RootNode,
        Text => TextNode,
        Container => ContainerNode,
        Table => TableNode,
        TableRow => TableRowNode,
        TableCell => TableCellNode,
        Image => ImageNode,
        Link => LinkNode,
        Sentinel => SentinelNode,
    );

    /// Type discriminator of this variant
    pub fn type_name(&self) -> &'static str {
        dispatch_kind!(self, n => type_of(n))
    }

    /// Current record schema version of this variant
    pub fn version(&self) -> u32 {
        dispatch_kind!(self, n => version_of(n))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Capabilities
    // ─────────────────────────────────────────────────────────────────────────

    /// View as a children-capable node
    pub fn as_element(&self) -> Option<&dyn ElementLike> {
        match self {
            Self::Root(n) => Some(n),
            Self::Container(n) => Some(n),
            Self::Table(n) => Some(n),
            Self::TableRow(n) => Some(n),
            Self::TableCell(n) => Some(n),
            _ => None,
        }
    }

    /// Mutable view as a children-capable node
    pub fn as_element_mut(&mut self) -> Option<&mut dyn ElementLike> {
        match self {
            Self::Root(n) => Some(n),
            Self::Container(n) => Some(n),
            Self::Table(n) => Some(n),
            Self::TableRow(n) => Some(n),
            Self::TableCell(n) => Some(n),
            _ => None,
        }
    }

    /// View as an opaque-surface leaf
    pub fn as_decorator(&self) -> Option<&dyn Decorator> {
        match self {
            Self::Image(n) => Some(n),
            Self::Link(n) => Some(n),
            Self::Sentinel(n) => Some(n),
            _ => None,
        }
    }

    /// Whether this variant may own children
    pub fn is_element(&self) -> bool {
        self.as_element().is_some()
    }

    /// Whether this variant renders an opaque leaf surface
    pub fn is_decorator(&self) -> bool {
        self.as_decorator().is_some()
    }

    /// Inline layout classification
    pub fn is_inline(&self) -> bool {
        match self {
            Self::Text(_) | Self::Link(_) | Self::Image(_) => true,
            _ => self.as_element().is_some_and(|e| e.is_inline()),
        }
    }

    /// Decoration for opaque leaves, `None` for everything else
    pub fn decoration(&self) -> Option<Decoration> {
        self.as_decorator().map(|d| d.decorate())
    }

    /// Reject `child` unless this node accepts it as a direct child.
    pub fn check_child(&self, child: &NodeKind) -> DocResult<()> {
        match self.as_element() {
            Some(element) if element.accepts(child) => Ok(()),
            _ => Err(DocError::structural(&self.describe(), child.type_name())),
        }
    }

    /// Type name, plus the tag for containers (`styled-element<br>`)
    pub fn describe(&self) -> String {
        match self {
            Self::Container(c) => format!("{}<{}>", ContainerNode::TYPE, c.tag),
            other => other.type_name().to_string(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch to NodeType
    // ─────────────────────────────────────────────────────────────────────────

    /// Materialize through the host factory
    pub fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        dispatch_kind!(self, n => n.create_surface(factory))
    }

    /// Whether a surface built from `prev` must be rebuilt for `next`.
    ///
    /// A change of variant is always stale.
    pub fn is_stale(prev: &NodeKind, next: &NodeKind) -> bool {
        dispatch_kind_pair!(prev, next, a, b => NodeType::is_stale(a, b), _ => true)
    }

    /// Patch a surface built from `prev` in place. No-op across variants.
    pub fn patch_surface<F: SurfaceFactory + ?Sized>(
        prev: &NodeKind,
        next: &NodeKind,
        surface: &mut F::Surface,
        factory: &mut F,
    ) {
        dispatch_kind_pair!(prev, next, a, b => NodeType::patch_surface(a, b, surface, factory), _ => ())
    }

    /// Payload fields for a structured record
    pub fn export_fields(&self) -> DocResult<RecordFields> {
        dispatch_kind!(self, n => n.export_fields())
    }
}

// =============================================================================
// Node
// =============================================================================

/// One entity of the document tree
///
/// `Clone` is identity preserving: the copy keeps the key and parent and
/// owns a deep copy of the payload. This is what copy-on-write relies on.
#[derive(Debug, Clone)]
pub struct Node {
    key: NodeKey,
    parent: Option<NodeKey>,
    kind: NodeKind,
}

impl Node {
    /// Create a detached node with a fresh key
    pub fn new(kind: impl Into<NodeKind>) -> Self {
        Self {
            key: NodeKey::next(),
            parent: None,
            kind: kind.into(),
        }
    }

    /// Key of this node
    #[inline]
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Parent key, `None` for the root and detached nodes
    #[inline]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeKey>) {
        self.parent = parent;
    }

    /// Payload
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Mutable payload
    #[inline]
    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Type discriminator
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Child keys in order; empty for leaves
    pub fn children(&self) -> &[NodeKey] {
        match self.kind.as_element() {
            Some(element) => element.children().as_slice(),
            None => &[],
        }
    }

    /// Typed payload access
    pub fn get<T: NodeType>(&self) -> Option<&T> {
        T::from_kind(&self.kind)
    }

    /// Typed mutable payload access
    pub fn get_mut<T: NodeType>(&mut self) -> Option<&mut T> {
        T::from_kind_mut(&mut self.kind)
    }

    /// Typed payload access that reports the actual variant on mismatch
    pub fn try_get<T: NodeType>(&self) -> DocResult<&T> {
        let found = self.type_name();
        self.get::<T>().ok_or(DocError::TypeMismatch {
            expected: T::TYPE,
            found,
        })
    }

    /// Check the variant
    pub fn is<T: NodeType>(&self) -> bool {
        T::matches(self)
    }
}
