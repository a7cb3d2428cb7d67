//! Capability traits
//!
//! Variants compose behavior from two small capabilities instead of
//! inheriting it:
//!
//! - [`ElementLike`]: owns an ordered list of child keys and decides which
//!   child kinds it accepts
//! - [`Decorator`]: a leaf that renders an opaque surface the host draws
//!   itself (image, anchor, scroll marker)
//!
//! A variant implements at most one of them. Text implements neither.

use smallvec::SmallVec;

use crate::id::NodeKey;
use crate::render::Decoration;

use super::NodeKind;

/// Ordered child keys of an element-like node.
pub type Children = SmallVec<[NodeKey; 8]>;

// =============================================================================
// ElementLike
// =============================================================================

/// Capability of owning children.
pub trait ElementLike {
    /// Child keys in document order
    fn children(&self) -> &Children;

    /// Mutable child keys
    fn children_mut(&mut self) -> &mut Children;

    /// Whether `child` may be attached directly under this node.
    fn accepts(&self, child: &NodeKind) -> bool;

    /// Inline (flows with text) rather than block layout
    fn is_inline(&self) -> bool {
        false
    }
}

/// Acceptance rule shared by the root and block containers: anything that
/// is not a root and not a table part.
pub(crate) fn accepts_flow_content(child: &NodeKind) -> bool {
    !matches!(
        child,
        NodeKind::Root(_) | NodeKind::TableRow(_) | NodeKind::TableCell(_)
    )
}

/// Acceptance rule for table cells: inline content only.
pub(crate) fn accepts_inline_content(child: &NodeKind) -> bool {
    match child {
        NodeKind::Text(_) | NodeKind::Link(_) | NodeKind::Image(_) => true,
        NodeKind::Container(c) => c.is_inline(),
        _ => false,
    }
}

// =============================================================================
// Decorator
// =============================================================================

/// Capability of rendering an opaque leaf surface.
pub trait Decorator {
    /// What the host should draw for this node.
    fn decorate(&self) -> Decoration;
}
