//! Link decorator: `<a href>` flattened to its text

use serde::{Deserialize, Serialize};

use crate::attr::AttrsExt;
use crate::convert::SourceElement;
use crate::node::{Decorator, NodeType};
use crate::registry::{Conversion, DomConversion};
use crate::render::{Decoration, SurfaceFactory};

// =============================================================================
// LinkNode
// =============================================================================

/// Link leaf: target URL and display text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkNode {
    pub href: String,
    pub text: String,
}

impl LinkNode {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }

    /// Build from an `<a>`; `None` when `href` is missing or blank.
    ///
    /// Display text is the trimmed text content, or the href when that is empty.
    pub fn from_source(element: &SourceElement) -> Option<Self> {
        let href = element.attrs.get_non_empty("href")?;
        let content = element.text_content();
        let text = match content.trim() {
            "" => href,
            trimmed => trimmed,
        };
        Some(Self::new(href, text))
    }

    pub fn link_type(&self) -> LinkType {
        LinkType::from_href(&self.href)
    }
}

impl Decorator for LinkNode {
    fn decorate(&self) -> Decoration {
        Decoration::Anchor {
            href: self.href.clone(),
            text: self.text.clone(),
            external: self.link_type().is_external(),
        }
    }
}

fn convert_anchor(element: &SourceElement) -> Conversion {
    match LinkNode::from_source(element) {
        Some(link) => Conversion::Node(link.into()),
        None => Conversion::Skip,
    }
}

// Anchors pasted from outside keep their markup as `a` containers (priority 1);
// this rule only wins when that one is not registered.
const CONVERSIONS: &[DomConversion] = &[DomConversion::new("a", 0, convert_anchor)];

impl NodeType for LinkNode {
    const TYPE: &'static str = "link";

    kind_conversions!(Link);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        let mut surface = factory.create_element("a");
        factory.set_attribute(&mut surface, "href", &self.href);
        if self.link_type().is_external() {
            factory.set_attribute(&mut surface, "target", "_blank");
            factory.set_attribute(&mut surface, "rel", "noopener noreferrer");
        }
        let text = factory.create_text(&self.text);
        factory.append_child(&mut surface, text);
        surface
    }

    /// Flipping between external and internal adds or drops `target`.
    fn is_stale(prev: &Self, next: &Self) -> bool {
        prev.link_type().is_external() != next.link_type().is_external()
    }

    fn patch_surface<F: SurfaceFactory + ?Sized>(
        prev: &Self,
        next: &Self,
        surface: &mut F::Surface,
        factory: &mut F,
    ) {
        if prev.href != next.href {
            factory.set_attribute(surface, "href", &next.href);
        }
        if prev.text != next.text {
            factory.set_text(surface, &next.text);
        }
    }

    fn conversions() -> &'static [DomConversion] {
        CONVERSIONS
    }
}

// =============================================================================
// LinkType
// =============================================================================

/// Link type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkType {
    #[default]
    None,
    Absolute,  // /path
    Relative,  // ./file
    Fragment,  // #anchor
    External,  // https://...
    Email,     // mailto:...
}

impl LinkType {
    /// Infer link type from href string
    pub fn from_href(href: &str) -> Self {
        let href = href.trim();
        if href.is_empty() {
            return Self::None;
        }
        if href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//") {
            Self::External
        } else if href.starts_with("mailto:") {
            Self::Email
        } else if href.starts_with('/') {
            Self::Absolute
        } else if href.starts_with('#') {
            Self::Fragment
        } else {
            Self::Relative
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::External)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HtmlSurfaceFactory;

    #[test]
    fn test_link_type() {
        assert_eq!(LinkType::from_href("https://example.com"), LinkType::External);
        assert_eq!(LinkType::from_href("/about"), LinkType::Absolute);
        assert_eq!(LinkType::from_href("#section"), LinkType::Fragment);
        assert_eq!(LinkType::from_href("./file"), LinkType::Relative);
        assert_eq!(LinkType::from_href("mailto:a@b.com"), LinkType::Email);
        assert_eq!(LinkType::from_href("  "), LinkType::None);
    }

    #[test]
    fn test_from_source_text_fallback() {
        let anchor = SourceElement::new("a")
            .with_attr("href", "/docs")
            .with_text("  Read the docs ");
        assert_eq!(LinkNode::from_source(&anchor), Some(LinkNode::new("/docs", "Read the docs")));

        let bare = SourceElement::new("a").with_attr("href", "/docs");
        assert_eq!(LinkNode::from_source(&bare), Some(LinkNode::new("/docs", "/docs")));

        let no_href = SourceElement::new("a").with_text("orphan");
        assert_eq!(LinkNode::from_source(&no_href), None);
    }

    #[test]
    fn test_surface_and_patch() {
        let mut factory = HtmlSurfaceFactory;
        let prev = LinkNode::new("/a", "A");
        let mut surface = prev.create_surface(&mut factory);
        assert_eq!(surface.to_html(), "<a href=\"/a\">A</a>");

        let next = LinkNode::new("/b", "B");
        assert!(!LinkNode::is_stale(&prev, &next));
        LinkNode::patch_surface(&prev, &next, &mut surface, &mut factory);
        assert_eq!(surface.to_html(), "<a href=\"/b\">B</a>");

        assert!(LinkNode::is_stale(&next, &LinkNode::new("https://x.dev", "B")));
    }
}
