//! Table, TableRow, TableCell
//!
//! Structure is enforced on attach: a table holds only rows, a row holds
//! only cells, a cell holds only inline content. The payloads themselves
//! are empty.
//!
//! A table has no caption slot, so pasted captions are skipped.

use serde::{Deserialize, Serialize};

use crate::convert::SourceElement;
use crate::node::{Children, ElementLike, NodeKind, NodeType, accepts_inline_content};
use crate::registry::{Conversion, DomConversion};
use crate::render::SurfaceFactory;

/// Implement `ElementLike` for a table part that accepts one child shape.
macro_rules! impl_table_part {
    ($ty:ty, |$child:ident| $accepts:expr) => {
        impl ElementLike for $ty {
            fn children(&self) -> &Children {
                &self.children
            }

            fn children_mut(&mut self) -> &mut Children {
                &mut self.children
            }

            fn accepts(&self, $child: &NodeKind) -> bool {
                $accepts
            }
        }
    };
}

// =============================================================================
// TableNode
// =============================================================================

/// Table; children are exclusively rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableNode {
    #[serde(skip)]
    children: Children,
}

impl_table_part!(TableNode, |child| child.is_table_row());

fn convert_table(_: &SourceElement) -> Conversion {
    Conversion::Node(TableNode::default().into())
}

/// Row groups add nothing to the model; their rows attach to the table.
fn convert_row_group(_: &SourceElement) -> Conversion {
    Conversion::Passthrough
}

fn convert_caption(_: &SourceElement) -> Conversion {
    Conversion::Skip
}

const TABLE_CONVERSIONS: &[DomConversion] = &[
    DomConversion::new("table", 2, convert_table),
    DomConversion::new("caption", 2, convert_caption),
    DomConversion::new("thead", 2, convert_row_group),
    DomConversion::new("tbody", 2, convert_row_group),
    DomConversion::new("tfoot", 2, convert_row_group),
];

impl NodeType for TableNode {
    const TYPE: &'static str = "table";

    kind_conversions!(Table);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        factory.create_element("table")
    }

    fn conversions() -> &'static [DomConversion] {
        TABLE_CONVERSIONS
    }
}

// =============================================================================
// TableRowNode
// =============================================================================

/// Table row; children are exclusively cells
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRowNode {
    #[serde(skip)]
    children: Children,
}

impl_table_part!(TableRowNode, |child| child.is_table_cell());

fn convert_row(_: &SourceElement) -> Conversion {
    Conversion::Node(TableRowNode::default().into())
}

const ROW_CONVERSIONS: &[DomConversion] = &[DomConversion::new("tr", 2, convert_row)];

impl NodeType for TableRowNode {
    const TYPE: &'static str = "table-row";

    kind_conversions!(TableRow);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        factory.create_element("tr")
    }

    fn conversions() -> &'static [DomConversion] {
        ROW_CONVERSIONS
    }
}

// =============================================================================
// TableCellNode
// =============================================================================

/// Table cell; children are inline content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCellNode {
    #[serde(skip)]
    children: Children,
}

impl_table_part!(TableCellNode, |child| accepts_inline_content(child));

fn convert_cell(_: &SourceElement) -> Conversion {
    Conversion::Node(TableCellNode::default().into())
}

const CELL_CONVERSIONS: &[DomConversion] = &[
    DomConversion::new("td", 2, convert_cell),
    DomConversion::new("th", 2, convert_cell),
];

impl NodeType for TableCellNode {
    const TYPE: &'static str = "table-cell";

    kind_conversions!(TableCell);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        factory.create_element("td")
    }

    fn conversions() -> &'static [DomConversion] {
        CELL_CONVERSIONS
    }
}
