//! NodeKind accessor and dispatch macros
//!
//! These macros eliminate repetitive match code over the node variants.
//! Identifier concatenation goes through `paste`.

// =============================================================================
// NodeKind accessor generation
// =============================================================================

/// Generate is_xxx, as_xxx, as_xxx_mut methods for NodeKind
///
/// # Generated methods per variant:
/// - `is_xxx(&self) -> bool` - type check
/// - `as_xxx(&self) -> Option<&Payload>` - immutable accessor
/// - `as_xxx_mut(&mut self) -> Option<&mut Payload>` - mutable accessor
///
/// # Example
/// ```ignore
/// impl NodeKind {
///     // TableRow -> is_table_row / as_table_row / as_table_row_mut
///     impl_kind_accessors!(TableRow => TableRowNode);
/// }
/// ```
macro_rules! impl_kind_accessors {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = "Check if this is a " $variant " node"]
                pub fn [<is_ $variant:snake>](&self) -> bool {
                    matches!(self, Self::$variant(_))
                }

                #[doc = "Try to get the " $variant " payload"]
                pub fn [<as_ $variant:snake>](&self) -> Option<&$ty> {
                    match self { Self::$variant(v) => Some(v), _ => None }
                }

                #[doc = "Try to get the " $variant " payload mutably"]
                pub fn [<as_ $variant:snake _mut>](&mut self) -> Option<&mut $ty> {
                    match self { Self::$variant(v) => Some(v), _ => None }
                }
            )*
        }
    };
}

/// Generate `From<Payload> for NodeKind` for every variant
macro_rules! impl_kind_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for $crate::node::NodeKind {
                fn from(payload: $ty) -> Self {
                    Self::$variant(payload)
                }
            }
        )*
    };
}

/// Generate the `NodeType` conversion methods for one variant
///
/// Used inside an `impl NodeType for XxxNode` block.
macro_rules! kind_conversions {
    ($variant:ident) => {
        fn into_kind(self) -> $crate::node::NodeKind {
            $crate::node::NodeKind::$variant(self)
        }

        fn from_kind(kind: &$crate::node::NodeKind) -> Option<&Self> {
            match kind {
                $crate::node::NodeKind::$variant(v) => Some(v),
                _ => None,
            }
        }

        fn from_kind_mut(kind: &mut $crate::node::NodeKind) -> Option<&mut Self> {
            match kind {
                $crate::node::NodeKind::$variant(v) => Some(v),
                _ => None,
            }
        }
    };
}

// =============================================================================
// NodeKind dispatch
// =============================================================================

/// Match on every NodeKind variant, binding the payload to `$node`
///
/// The body is expanded once per variant, so it may call generic
/// `NodeType` methods and have the concrete type inferred.
///
/// # Example
/// ```ignore
/// dispatch_kind!(kind, n => n.export_fields())
/// ```
macro_rules! dispatch_kind {
    ($value:expr, $node:ident => $body:expr) => {
        match $value {
            $crate::node::NodeKind::Root($node) => $body,
            $crate::node::NodeKind::Text($node) => $body,
            $crate::node::NodeKind::Container($node) => $body,
            $crate::node::NodeKind::Table($node) => $body,
            $crate::node::NodeKind::TableRow($node) => $body,
            $crate::node::NodeKind::TableCell($node) => $body,
            $crate::node::NodeKind::Image($node) => $body,
            $crate::node::NodeKind::Link($node) => $body,
            $crate::node::NodeKind::Sentinel($node) => $body,
        }
    };
}

/// Match two NodeKinds of the same variant, binding both payloads
///
/// Pairs of different variants take the fallback arm.
///
/// # Example
/// ```ignore
/// dispatch_kind_pair!(prev, next, a, b => same_variant(a, b), _ => true)
/// ```
macro_rules! dispatch_kind_pair {
    ($prev:expr, $next:expr, $a:ident, $b:ident => $body:expr, _ => $fallback:expr) => {
        match ($prev, $next) {
            ($crate::node::NodeKind::Root($a), $crate::node::NodeKind::Root($b)) => $body,
            ($crate::node::NodeKind::Text($a), $crate::node::NodeKind::Text($b)) => $body,
            ($crate::node::NodeKind::Container($a), $crate::node::NodeKind::Container($b)) => $body,
            ($crate::node::NodeKind::Table($a), $crate::node::NodeKind::Table($b)) => $body,
            ($crate::node::NodeKind::TableRow($a), $crate::node::NodeKind::TableRow($b)) => $body,
            ($crate::node::NodeKind::TableCell($a), $crate::node::NodeKind::TableCell($b)) => $body,
            ($crate::node::NodeKind::Image($a), $crate::node::NodeKind::Image($b)) => $body,
            ($crate::node::NodeKind::Link($a), $crate::node::NodeKind::Link($b)) => $body,
            ($crate::node::NodeKind::Sentinel($a), $crate::node::NodeKind::Sentinel($b)) => $body,
            _ => $fallback,
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::node::{NodeKind, NodeType};
    use crate::nodes::{ContainerNode, TableRowNode, TextNode};

    #[test]
    fn test_generated_accessors() {
        let mut kind = NodeKind::from(TableRowNode::default());
        assert!(kind.is_table_row());
        assert!(!kind.is_table_cell());
        assert!(kind.as_table_row().is_some());
        assert!(kind.as_table_row_mut().is_some());
        assert!(kind.as_text().is_none());
    }

    #[test]
    fn test_dispatch_reaches_concrete_type() {
        fn type_of<T: NodeType>(_: &T) -> &'static str {
            T::TYPE
        }

        let kinds = [
            NodeKind::from(TextNode::new("x")),
            NodeKind::from(ContainerNode::new("p")),
        ];
        let names: Vec<_> = kinds.iter().map(|k| dispatch_kind!(k, n => type_of(n))).collect();
        assert_eq!(names, ["text", "styled-element"]);
    }
}
