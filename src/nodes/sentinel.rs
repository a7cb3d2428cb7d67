//! Scroll sentinels
//!
//! Zero-height markers at the top and bottom of a virtualized document.
//! External scroll logic watches them; they are never document content, so
//! parent exports, HTML export and checkpoints leave them out.

use serde::{Deserialize, Serialize};

use crate::node::{Decorator, NodeType};
use crate::render::{Decoration, SurfaceFactory};

/// Which edge of the document a sentinel marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelPosition {
    #[default]
    Top,
    Bottom,
}

impl SentinelPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Invisible marker leaf
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelNode {
    pub position: SentinelPosition,
}

impl SentinelNode {
    pub fn top() -> Self {
        Self {
            position: SentinelPosition::Top,
        }
    }

    pub fn bottom() -> Self {
        Self {
            position: SentinelPosition::Bottom,
        }
    }
}

impl Decorator for SentinelNode {
    fn decorate(&self) -> Decoration {
        Decoration::Marker
    }
}

impl NodeType for SentinelNode {
    const TYPE: &'static str = "sentinel";

    kind_conversions!(Sentinel);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        let mut surface = factory.create_element("div");
        factory.set_attribute(&mut surface, "data-sentinel", self.position.as_str());
        factory.set_attribute(&mut surface, "style", "height: 1px; background: transparent");
        surface
    }

    fn patch_surface<F: SurfaceFactory + ?Sized>(
        prev: &Self,
        next: &Self,
        surface: &mut F::Surface,
        factory: &mut F,
    ) {
        if prev.position != next.position {
            factory.set_attribute(surface, "data-sentinel", next.position.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HtmlSurfaceFactory;

    #[test]
    fn test_surface() {
        let mut factory = HtmlSurfaceFactory;
        let surface = SentinelNode::bottom().create_surface(&mut factory);
        assert_eq!(surface.attr("data-sentinel"), Some("bottom"));
        assert_eq!(SentinelNode::top().decorate(), Decoration::Marker);
    }

    #[test]
    fn test_position_record() {
        let fields = SentinelNode::bottom().export_fields().ok();
        assert_eq!(
            fields.and_then(|f| f.get("position").cloned()),
            Some(serde_json::Value::from("bottom"))
        );
    }
}
