//! Built-in node variants.
//!
//! | Variant | `type` | Capability |
//! |---------|--------|------------|
//! | [`RootNode`] | `root` | element |
//! | [`TextNode`] | `text` | — |
//! | [`ContainerNode`] | `styled-element` | element |
//! | [`TableNode`] | `table` | element |
//! | [`TableRowNode`] | `table-row` | element |
//! | [`TableCellNode`] | `table-cell` | element |
//! | [`ImageNode`] | `image` | decorator |
//! | [`LinkNode`] | `link` | decorator |
//! | [`SentinelNode`] | `sentinel` | decorator |

pub mod container;
pub mod image;
pub mod link;
pub mod sentinel;
pub mod table;
pub mod text;

pub use container::ContainerNode;
pub use image::ImageNode;
pub use link::{LinkNode, LinkType};
pub use sentinel::{SentinelNode, SentinelPosition};
pub use table::{TableCellNode, TableNode, TableRowNode};
pub use text::{RootNode, TextNode};
