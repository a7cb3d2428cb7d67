//! Prelude module for common imports.
//!
//! ```ignore
//! use tola_doctree::prelude::*;
//! ```

// Node model
pub use crate::node::{Decorator, ElementLike, Node, NodeKind, NodeType};

// Built-in variants
pub use crate::nodes::{
    ContainerNode, ImageNode, LinkNode, LinkType, RootNode, SentinelNode, SentinelPosition,
    TableCellNode, TableNode, TableRowNode, TextNode,
};

// Tree
pub use crate::tree::{Editor, EditorState, Savepoint, Transaction, TreeStats};

// Registry
pub use crate::registry::{Conversion, DomConversion, Registry};

// Import
pub use crate::import::{ImportConfig, ImportStats, MarkupImporter, import_markup};

// Serialization
pub use crate::serialize::{StructuredRecord, export_node, from_json, to_json};

// Render
pub use crate::render::{
    Decoration, HtmlSurface, HtmlSurfaceFactory, RenderConfig, SurfaceFactory, render_html,
};

// Checkpoints
pub use crate::checkpoint::{CheckpointStats, Checkpointer};
pub use crate::store::{ChunkStore, DirChunkStore, MemoryChunkStore};

// Identity
pub use crate::id::NodeKey;

// Error
pub use crate::error::{DocError, DocResult, ImportCause};
