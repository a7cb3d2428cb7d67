//! Process-local node identity
//!
//! Every node gets a [`NodeKey`] when it is constructed. Keys are:
//! - unique within the process (and therefore within any one tree)
//! - preserved when a node is cloned for mutation, so identity survives
//!   copy-on-write
//! - never persisted: structured records and checkpoints carry no keys
//!
//! Rendered surfaces may carry the key as a hex attribute for host-side lookup.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next key to hand out. Zero is never issued.
static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// NodeKey
// =============================================================================

/// Identifier of a node inside its owning tree.
///
/// # Memory Layout
///
/// - 8 bytes (u64)
/// - Copy, no heap allocation
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u64);

impl NodeKey {
    /// Issue a fresh key.
    #[inline]
    pub fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a key from a raw value.
    ///
    /// Only meaningful for keys previously obtained from [`as_raw`](Self::as_raw)
    /// in the same process, e.g. read back from a rendered surface attribute.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 representation
    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    /// Lowercase hex form used in surface attributes (no leading `#`).
    #[inline]
    pub fn to_attr_value(self) -> String {
        format!("{:x}", self.0)
    }

    /// Parse the value produced by [`to_attr_value`](Self::to_attr_value).
    pub fn from_attr_value(value: &str) -> Option<Self> {
        u64::from_str_radix(value, 16).ok().map(Self)
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({:x})", self.0)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
