//! The per-variant contract
//!
//! Every concrete node payload implements [`NodeType`]. The trait bundles
//! what a variant must answer for the rest of the crate:
//!
//! | Concern | Items |
//! |---------|-------|
//! | identity | `TYPE`, `VERSION`, `matches` |
//! | sum type | `into_kind`, `from_kind`, `from_kind_mut` |
//! | rendering | `create_surface`, `is_stale`, `patch_surface` |
//! | structured records | `export_fields`, `import_fields`, `upgrade`, `import_record` |
//! | paste reconstruction | `conversions` |
//!
//! Payload fields go through serde, so the default record methods are
//! usually all a variant needs. Children are never part of the payload.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DocError, DocResult};
use crate::registry::DomConversion;
use crate::render::SurfaceFactory;
use crate::serialize::{RecordFields, StructuredRecord};

use super::{Node, NodeKind};

/// Contract implemented by every node payload.
pub trait NodeType:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Serialization tag; unique per variant and stable across versions.
    const TYPE: &'static str;

    /// Current schema version of this variant's structured record.
    const VERSION: u32 = 1;

    /// Wrap the payload in the node sum type.
    fn into_kind(self) -> NodeKind;

    /// Borrow the payload if `kind` is this variant.
    fn from_kind(kind: &NodeKind) -> Option<&Self>;

    /// Mutably borrow the payload if `kind` is this variant.
    fn from_kind_mut(kind: &mut NodeKind) -> Option<&mut Self>;

    /// Type guard over any node.
    fn matches(node: &Node) -> bool {
        Self::from_kind(node.kind()).is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Materialize this node (without its children) through the host factory.
    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface;

    /// Whether a surface built from `prev` must be thrown away for `next`.
    ///
    /// When this returns `false` the host calls [`patch_surface`](Self::patch_surface)
    /// instead of rebuilding.
    fn is_stale(prev: &Self, next: &Self) -> bool {
        let _ = (prev, next);
        false
    }

    /// Bring a surface built from `prev` up to date with `next` in place.
    fn patch_surface<F: SurfaceFactory + ?Sized>(
        prev: &Self,
        next: &Self,
        surface: &mut F::Surface,
        factory: &mut F,
    ) {
        let _ = (prev, next, surface, factory);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structured records
    // ─────────────────────────────────────────────────────────────────────────

    /// Payload fields of this node's structured record.
    fn export_fields(&self) -> DocResult<RecordFields> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Ok(RecordFields::new()),
        }
    }

    /// Rebuild the payload from record fields at the current `VERSION`.
    fn import_fields(fields: RecordFields) -> DocResult<Self> {
        serde_json::from_value(Value::Object(fields))
            .map_err(|err| DocError::invalid_record(Self::TYPE, err))
    }

    /// Rewrite fields written by schema version `from` (< `VERSION`).
    fn upgrade(fields: &mut RecordFields, from: u32) {
        let _ = (fields, from);
    }

    /// Import one record of this type, upgrading older versions in place.
    ///
    /// Children in the record are ignored here; see
    /// [`Transaction::import_records`](crate::tree::Transaction::import_records).
    fn import_record(record: &StructuredRecord) -> DocResult<Self> {
        if record.node_type != Self::TYPE {
            return Err(DocError::invalid_record(
                Self::TYPE,
                format_args!("record has type `{}`", record.node_type),
            ));
        }
        if record.version > Self::VERSION {
            return Err(DocError::UnsupportedVersion {
                node_type: record.node_type.clone(),
                found: record.version,
                supported: Self::VERSION,
            });
        }

        let mut fields = record.fields.clone();
        if record.version < Self::VERSION {
            tracing::debug!(
                node_type = Self::TYPE,
                from = record.version,
                to = Self::VERSION,
                "upgrading structured record"
            );
            Self::upgrade(&mut fields, record.version);
        }
        Self::import_fields(fields)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reconstruction
    // ─────────────────────────────────────────────────────────────────────────

    /// `(tag, priority) -> conversion` rules this variant claims.
    fn conversions() -> &'static [DomConversion] {
        &[]
    }
}
