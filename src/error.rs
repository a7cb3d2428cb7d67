//! Error types for tola-doctree.
//!
//! Unsupported markup is *not* an error: the importer logs it and inserts a
//! visible placeholder. Everything here is either a broken invariant, a
//! failed import, or a record the importer refuses to guess about.

use thiserror::Error;

use crate::id::NodeKey;

/// Errors that can occur while building, mutating or (de)serializing a tree.
#[derive(Debug, Error)]
pub enum DocError {
    /// A child was attached where the parent's structure forbids it
    #[error("structural violation: {0}")]
    StructuralViolation(String),

    /// Markup could not be read or had no body; the cause says which
    #[error("import failed: {0}")]
    ImportFailure(#[source] ImportCause),

    /// Structured record written by a newer schema than this build knows
    #[error("unsupported version v{found} for node type `{node_type}` (supported up to v{supported})")]
    UnsupportedVersion {
        /// Record `type` discriminator
        node_type: String,
        /// Version found in the record
        found: u32,
        /// Highest version this build understands
        supported: u32,
    },

    /// Structured record names a type nobody registered
    #[error("unknown node type `{0}`")]
    UnknownType(String),

    /// A type discriminator was registered twice
    #[error("node type `{0}` is already registered")]
    DuplicateType(&'static str),

    /// Typed access to a node of a different variant
    #[error("expected a `{expected}` node, found `{found}`")]
    TypeMismatch {
        /// Requested type discriminator
        expected: &'static str,
        /// Actual type discriminator
        found: &'static str,
    },

    /// Key is not (or no longer) part of the tree
    #[error("node {0} does not exist")]
    MissingNode(NodeKey),

    /// Record fields do not fit the variant's payload
    #[error("invalid `{node_type}` record: {message}")]
    InvalidRecord {
        /// Record `type` discriminator
        node_type: String,
        /// What was wrong with it
        message: String,
    },

    /// JSON encoding/decoding failed
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Chunk store I/O failed
    #[error("chunk store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a markup import failed.
#[derive(Debug, Error)]
pub enum ImportCause {
    /// The raw bytes could not be read
    #[error("could not read markup: {0}")]
    Read(#[source] std::io::Error),

    /// Parsed document has no `<body>` element
    #[error("document has no body element")]
    MissingBody,

    /// Building the tree broke a structural invariant
    #[error("{0}")]
    Structure(#[source] Box<DocError>),
}

/// Result type alias for document operations.
pub type DocResult<T> = Result<T, DocError>;

impl DocError {
    /// Create a structural violation for `child` placed under `parent`.
    pub fn structural(parent: &str, child: &str) -> Self {
        Self::StructuralViolation(format!("`{parent}` cannot contain `{child}`"))
    }

    /// Create an invalid-record error.
    pub fn invalid_record(node_type: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidRecord {
            node_type: node_type.into(),
            message: message.to_string(),
        }
    }

    /// Wrap an error raised while an import was populating the tree.
    ///
    /// Errors that already describe an import failure pass through unchanged.
    pub fn import_failure(err: DocError) -> Self {
        match err {
            Self::ImportFailure(_) => err,
            other => Self::ImportFailure(ImportCause::Structure(Box::new(other))),
        }
    }

    /// Check if this is a structural violation, directly or as an import cause.
    pub fn is_structural(&self) -> bool {
        match self {
            Self::StructuralViolation(_) => true,
            Self::ImportFailure(ImportCause::Structure(inner)) => inner.is_structural(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for DocError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DocError::UnsupportedVersion {
            node_type: "image".into(),
            found: 3,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "unsupported version v3 for node type `image` (supported up to v1)"
        );

        let err = DocError::structural("table-row", "text");
        assert_eq!(err.to_string(), "structural violation: `table-row` cannot contain `text`");

        let err = DocError::ImportFailure(ImportCause::MissingBody);
        assert_eq!(err.to_string(), "import failed: document has no body element");
    }

    #[test]
    fn test_import_failure_wraps_once() {
        let err = DocError::import_failure(DocError::structural("table", "link"));
        assert!(err.is_structural());
        assert!(matches!(err, DocError::ImportFailure(ImportCause::Structure(_))));

        let err = DocError::import_failure(DocError::ImportFailure(ImportCause::MissingBody));
        assert!(matches!(err, DocError::ImportFailure(ImportCause::MissingBody)));
        assert!(!err.is_structural());
    }

    #[test]
    fn test_error_is_send_sync() {
        static_assertions::assert_impl_all!(DocError: Send, Sync);
        static_assertions::assert_impl_all!(ImportCause: Send, Sync);
    }
}
