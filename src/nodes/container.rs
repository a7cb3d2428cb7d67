//! Container: the generic styled element
//!
//! One variant covers paragraphs, divs, spans, headings, lists, list items,
//! line breaks and placeholders. The `tag` decides:
//!
//! - layout: `a span sup sub mark br` are inline, everything else is block
//! - attributes: only `a` containers carry a link target
//! - children: void tags (`br`, `hr`) take none
//!
//! Record schema history:
//! - v1: `href` was always written, as `""` when absent; `tag` could be missing
//! - v2: `href` only present on anchors

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::attr::AttrsExt;
use crate::convert::SourceElement;
use crate::error::{DocError, DocResult};
use crate::node::{Children, ElementLike, NodeKind, NodeType, accepts_flow_content};
use crate::nodes::LinkType;
use crate::registry::{Conversion, DomConversion};
use crate::render::{SurfaceFactory, is_void_element};
use crate::serialize::RecordFields;

/// Tags rendered inline.
const INLINE_TAGS: &[&str] = &["a", "span", "sup", "sub", "mark", "br"];

/// Tag used when a record or source element does not name one.
const DEFAULT_TAG: &str = "div";

// =============================================================================
// ContainerNode
// =============================================================================

/// Generic styled block or inline element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerNode {
    /// Inline style string, verbatim
    #[serde(default)]
    pub style: String,
    /// Source tag name, lower-cased
    #[serde(default = "default_tag")]
    pub tag: CompactString,
    /// Link target; only ever set when `tag == "a"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    href: Option<String>,
    #[serde(skip)]
    children: Children,
}

fn default_tag() -> CompactString {
    CompactString::new(DEFAULT_TAG)
}

impl Default for ContainerNode {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl ContainerNode {
    /// Create an unstyled container for `tag`
    pub fn new(tag: &str) -> Self {
        let tag = if tag.is_empty() {
            default_tag()
        } else {
            CompactString::from(tag.to_ascii_lowercase())
        };
        Self {
            style: String::new(),
            tag,
            href: None,
            children: Children::new(),
        }
    }

    /// Set the inline style
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Set the link target; ignored unless this is an `a` container
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        if self.is_anchor() {
            let href = href.into();
            self.href = (!href.is_empty()).then_some(href);
        }
        self
    }

    /// An inline line break (`br`)
    pub fn line_break() -> Self {
        Self::new("br")
    }

    /// Build from a source element: tag, `style` attribute and, for anchors, `href`
    pub fn from_source(element: &SourceElement) -> Self {
        let mut container = Self::new(&element.tag)
            .with_style(element.attrs.get_attr("style").unwrap_or_default());
        if let Some(href) = element.attrs.get_non_empty("href") {
            container = container.with_href(href);
        }
        container
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Link target, if any
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Change the link target.
    ///
    /// Fails with `StructuralViolation` on containers other than `a`.
    pub fn set_href(&mut self, href: Option<String>) -> DocResult<()> {
        if !self.is_anchor() && href.is_some() {
            return Err(DocError::StructuralViolation(format!(
                "only `a` containers carry a link target, not `{}`",
                self.tag
            )));
        }
        self.href = href.filter(|h| !h.is_empty());
        Ok(())
    }

    /// Check if this is an anchor container
    pub fn is_anchor(&self) -> bool {
        self.tag == "a"
    }

    /// Check if this is a line break
    pub fn is_line_break(&self) -> bool {
        self.tag == "br"
    }

    /// Check if this is a list (`ul`/`ol`)
    pub fn is_list(&self) -> bool {
        matches!(self.tag.as_str(), "ul" | "ol")
    }

    /// Void containers take no children
    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag)
    }

    /// Heading level for `h1`..`h6`
    pub fn heading_level(&self) -> Option<u8> {
        Self::level_from_tag(&self.tag)
    }

    /// Parse level from tag name: "h1" → 1
    pub fn level_from_tag(tag: &str) -> Option<u8> {
        match tag.as_bytes() {
            [b'h', digit @ b'1'..=b'6'] => Some(digit - b'0'),
            _ => None,
        }
    }
}

impl ElementLike for ContainerNode {
    fn children(&self) -> &Children {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    fn accepts(&self, child: &NodeKind) -> bool {
        !self.is_void() && accepts_flow_content(child)
    }

    fn is_inline(&self) -> bool {
        INLINE_TAGS.contains(&self.tag.as_str())
    }
}

// =============================================================================
// NodeType
// =============================================================================

fn convert_element(element: &SourceElement) -> Conversion {
    Conversion::Node(ContainerNode::from_source(element).into())
}

const CONVERSIONS: &[DomConversion] = &[
    DomConversion::new("table", 1, convert_element),
    DomConversion::new("thead", 1, convert_element),
    DomConversion::new("tbody", 1, convert_element),
    DomConversion::new("tfoot", 1, convert_element),
    DomConversion::new("tr", 1, convert_element),
    DomConversion::new("td", 1, convert_element),
    DomConversion::new("th", 1, convert_element),
    DomConversion::new("div", 1, convert_element),
    DomConversion::new("a", 1, convert_element),
    DomConversion::new("span", 1, convert_element),
    DomConversion::new("section", 1, convert_element),
    DomConversion::new("article", 1, convert_element),
    DomConversion::new("header", 1, convert_element),
    DomConversion::new("footer", 1, convert_element),
    DomConversion::new("br", 1, convert_element),
    DomConversion::new("sup", 1, convert_element),
    DomConversion::new("sub", 1, convert_element),
    DomConversion::new("mark", 1, convert_element),
    DomConversion::new("nav", 1, convert_element),
    DomConversion::new("main", 1, convert_element),
    DomConversion::new("aside", 1, convert_element),
    DomConversion::new("p", 0, convert_element),
    DomConversion::new("h1", 0, convert_element),
    DomConversion::new("h2", 0, convert_element),
    DomConversion::new("h3", 0, convert_element),
    DomConversion::new("h4", 0, convert_element),
    DomConversion::new("h5", 0, convert_element),
    DomConversion::new("h6", 0, convert_element),
    DomConversion::new("ul", 0, convert_element),
    DomConversion::new("ol", 0, convert_element),
    DomConversion::new("li", 0, convert_element),
    DomConversion::new("blockquote", 0, convert_element),
];

impl NodeType for ContainerNode {
    const TYPE: &'static str = "styled-element";
    const VERSION: u32 = 2;

    kind_conversions!(Container);

    fn create_surface<F: SurfaceFactory + ?Sized>(&self, factory: &mut F) -> F::Surface {
        let mut surface = factory.create_element(&self.tag);
        if !self.style.is_empty() {
            factory.set_attribute(&mut surface, "style", &self.style);
        }
        if let Some(href) = self.href() {
            factory.set_attribute(&mut surface, "href", href);
            if LinkType::from_href(href).is_external() {
                factory.set_attribute(&mut surface, "target", "_blank");
                factory.set_attribute(&mut surface, "rel", "noopener noreferrer");
            }
        }
        surface
    }

    /// Tag changes need a new element; style and link target patch in place.
    fn is_stale(prev: &Self, next: &Self) -> bool {
        prev.tag != next.tag
    }

    fn patch_surface<F: SurfaceFactory + ?Sized>(
        prev: &Self,
        next: &Self,
        surface: &mut F::Surface,
        factory: &mut F,
    ) {
        if prev.style != next.style {
            if next.style.is_empty() {
                factory.remove_attribute(surface, "style");
            } else {
                factory.set_attribute(surface, "style", &next.style);
            }
        }
        if next.is_anchor() && prev.href != next.href {
            match next.href() {
                Some(href) => factory.set_attribute(surface, "href", href),
                None => factory.remove_attribute(surface, "href"),
            }
        }
    }

    fn import_fields(fields: RecordFields) -> DocResult<Self> {
        let raw: Self = serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|err| DocError::invalid_record(Self::TYPE, err))?;
        // Re-run the constructor rules: lower-case tag, anchors-only href.
        let mut container = Self::new(&raw.tag).with_style(raw.style);
        if let Some(href) = raw.href {
            container = container.with_href(href);
        }
        Ok(container)
    }

    fn upgrade(fields: &mut RecordFields, from: u32) {
        if from < 2 {
            let tag = fields
                .get("tag")
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TAG)
                .to_ascii_lowercase();
            let href_is_blank = fields
                .get("href")
                .is_some_and(|h| h.as_str().is_none_or(str::is_empty));
            if href_is_blank || tag != "a" {
                fields.remove("href");
            }
            fields.insert("tag".into(), tag.into());
        }
    }

    fn conversions() -> &'static [DomConversion] {
        CONVERSIONS
    }
}
