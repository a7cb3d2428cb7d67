//! Text runs and the document root
//!
//! Both are primitives every editor host has; they are modelled here so the
//! arena is self-contained.

use serde::{Deserialize, Serialize};

use crate::node::{Children, ElementLike, NodeKind, NodeType, accepts_flow_content};
use crate::render::SurfaceFactory;

// =============================================================================
// TextNode
// =============================================================================

/// Text content node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    /// Text content
    pub text: String,
}

impl TextNode {
    /// Create a new text node
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Check if text content is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check if text is only whitespace
    pub fn is_whitespace(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get trimmed content
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

impl NodeType for TextNode {
    const TYPE: &'static str = "text";

    kind_conversions!(Text);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        factory.create_text(&self.text)
    }

    fn patch_surface<F: SurfaceFactory + ?Sized>(
        prev: &Self,
        next: &Self,
        surface: &mut F::Surface,
        factory: &mut F,
    ) {
        if prev.text != next.text {
            factory.set_text(surface, &next.text);
        }
    }
}

// =============================================================================
// RootNode
// =============================================================================

/// The document root: owns the top-level content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootNode {
    #[serde(skip)]
    children: Children,
}

impl ElementLike for RootNode {
    fn children(&self) -> &Children {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    fn accepts(&self, child: &NodeKind) -> bool {
        accepts_flow_content(child)
    }
}

impl NodeType for RootNode {
    const TYPE: &'static str = "root";

    kind_conversions!(Root);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        factory.create_element("div")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::TableNode;
    use crate::render::HtmlSurfaceFactory;

    #[test]
    fn test_text_node() {
        let text = TextNode::new("  hello world  ");
        assert!(!text.is_empty());
        assert!(!text.is_whitespace());
        assert_eq!(text.trimmed(), "hello world");
        assert!(TextNode::new(" \n\t").is_whitespace());
    }

    #[test]
    fn test_text_patch() {
        let mut factory = HtmlSurfaceFactory;
        let prev = TextNode::new("old");
        let next = TextNode::new("new");
        let mut surface = prev.create_surface(&mut factory);
        assert!(!TextNode::is_stale(&prev, &next));
        TextNode::patch_surface(&prev, &next, &mut surface, &mut factory);
        assert_eq!(surface.to_html(), "new");
    }

    #[test]
    fn test_root_accepts_blocks_not_roots() {
        let root = RootNode::default();
        assert!(root.accepts(&TableNode::default().into()));
        assert!(root.accepts(&TextNode::new("x").into()));
        assert!(!root.accepts(&RootNode::default().into()));
    }

    #[test]
    fn test_text_record_fields() {
        let fields = TextNode::new("hi").export_fields().ok();
        assert_eq!(
            fields.and_then(|f| f.get("text").cloned()),
            Some(serde_json::Value::from("hi"))
        );
    }
}
