//! Image decorator: `<img>`

use serde::{Deserialize, Serialize};

use crate::attr::AttrsExt;
use crate::convert::SourceElement;
use crate::node::{Decorator, NodeType};
use crate::registry::{Conversion, DomConversion};
use crate::render::{Decoration, SurfaceFactory};

// =============================================================================
// ImageNode
// =============================================================================

/// Image leaf
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageNode {
    /// Source URL
    pub src: String,
}

impl ImageNode {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }

    /// Build from an `<img>`; `None` when `src` is missing or blank
    pub fn from_source(element: &SourceElement) -> Option<Self> {
        element.attrs.get_non_empty("src").map(Self::new)
    }

    /// Inline `data:` URL rather than a fetched resource
    pub fn is_inline_data(&self) -> bool {
        self.src.trim_start().starts_with("data:")
    }
}

impl Decorator for ImageNode {
    fn decorate(&self) -> Decoration {
        Decoration::Image {
            src: self.src.clone(),
        }
    }
}

fn convert_img(element: &SourceElement) -> Conversion {
    match ImageNode::from_source(element) {
        Some(image) => Conversion::Node(image.into()),
        None => Conversion::Skip,
    }
}

const CONVERSIONS: &[DomConversion] = &[DomConversion::new("img", 1, convert_img)];

impl NodeType for ImageNode {
    const TYPE: &'static str = "image";

    kind_conversions!(Image);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        let mut surface = factory.create_element("img");
        factory.set_attribute(&mut surface, "src", &self.src);
        factory.set_attribute(&mut surface, "alt", "");
        surface
    }

    fn patch_surface<F: SurfaceFactory + ?Sized>(
        prev: &Self,
        next: &Self,
        surface: &mut F::Surface,
        factory: &mut F,
    ) {
        if prev.src != next.src {
            factory.set_attribute(surface, "src", &next.src);
        }
    }

    fn conversions() -> &'static [DomConversion] {
        CONVERSIONS
    }
}
