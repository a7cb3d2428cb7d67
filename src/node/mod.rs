//! Typed node model
//!
//! - [`Node`]: key + parent link + payload
//! - [`NodeKind`]: the payload sum type, one variant per node type
//! - [`NodeType`]: the contract every payload implements
//! - [`ElementLike`] / [`Decorator`]: the two capabilities variants compose
//!
//! The concrete payloads live in [`crate::nodes`].

mod element;
mod node_type;
mod types;

pub use element::{Children, Decorator, ElementLike};
pub(crate) use element::{accepts_flow_content, accepts_inline_content};
pub use node_type::NodeType;
pub use types::{Node, NodeKind};
