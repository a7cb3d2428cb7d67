//! Rendering surfaces
//!
//! Nodes never touch a live DOM. They describe themselves through a
//! [`SurfaceFactory`] the host injects, and decide themselves whether an
//! existing surface can be patched ([`NodeType::is_stale`](crate::NodeType::is_stale)).
//!
//! [`HtmlSurfaceFactory`] is the built-in factory: it builds a small
//! [`HtmlSurface`] tree that serializes to an HTML string, which is how a
//! document is exported back to markup.
//!
//! ```text
//! EditorState ──materialize()──▶ F::Surface   (host factory)
//!             ──render_html()──▶ String       (HtmlSurfaceFactory)
//! ```

use crate::attr::{Attrs, AttrsExt};
use crate::id::NodeKey;
use crate::node::NodeKind;
use crate::tree::EditorState;

// =============================================================================
// SurfaceFactory
// =============================================================================

/// Host-provided builder for rendered surfaces.
pub trait SurfaceFactory {
    /// Handle to one rendered element or text run
    type Surface;

    /// Create an element surface
    fn create_element(&mut self, tag: &str) -> Self::Surface;

    /// Create a text run
    fn create_text(&mut self, content: &str) -> Self::Surface;

    /// Set (or overwrite) an attribute
    fn set_attribute(&mut self, surface: &mut Self::Surface, name: &str, value: &str);

    /// Remove an attribute if present
    fn remove_attribute(&mut self, surface: &mut Self::Surface, name: &str);

    /// Replace the content of a text run
    fn set_text(&mut self, surface: &mut Self::Surface, content: &str);

    /// Append `child` as the last child of `parent`
    fn append_child(&mut self, parent: &mut Self::Surface, child: Self::Surface);
}

/// What a decorator leaf asks the host to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoration {
    /// An image
    Image { src: String },
    /// A clickable anchor
    Anchor {
        href: String,
        text: String,
        external: bool,
    },
    /// An invisible marker (scroll sentinels)
    Marker,
}

// =============================================================================
// RenderConfig
// =============================================================================

/// Default attribute name carrying node keys on rendered surfaces.
pub const DEFAULT_KEY_ATTR: &str = "data-node-key";

/// Configuration for surface materialization.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Whether to tag each element surface with its node key.
    pub emit_keys: bool,
    /// Whether scroll sentinels are materialized.
    ///
    /// Sentinels are never document content, so HTML export leaves them out.
    pub include_sentinels: bool,
    /// Attribute name for node keys (default: "data-node-key").
    pub key_attr_name: String,
}

impl RenderConfig {
    /// Live editing surface (keys and sentinels).
    pub const DEV: Self = Self {
        emit_keys: true,
        include_sentinels: true,
        key_attr_name: String::new(), // Will use DEFAULT_KEY_ATTR
    };

    /// Markup export (content only).
    pub const PROD: Self = Self {
        emit_keys: false,
        include_sentinels: false,
        key_attr_name: String::new(),
    };

    /// Create a new config.
    pub fn new(emit_keys: bool, include_sentinels: bool) -> Self {
        Self {
            emit_keys,
            include_sentinels,
            key_attr_name: DEFAULT_KEY_ATTR.to_string(),
        }
    }

    /// Set custom attribute name for node keys.
    pub fn with_key_attr(mut self, attr_name: impl Into<String>) -> Self {
        self.key_attr_name = attr_name.into();
        self
    }

    /// Get the attribute name for node keys.
    pub fn key_attr(&self) -> &str {
        if self.key_attr_name.is_empty() {
            DEFAULT_KEY_ATTR
        } else {
            &self.key_attr_name
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::PROD
    }
}

// =============================================================================
// Materialization
// =============================================================================

/// Build the surface for `key` and its subtree.
///
/// Returns `None` if the key is unknown or the node is a sentinel the
/// config leaves out.
pub fn materialize<F: SurfaceFactory + ?Sized>(
    state: &EditorState,
    key: NodeKey,
    factory: &mut F,
    config: &RenderConfig,
) -> Option<F::Surface> {
    let node = state.get(key)?;
    if node.kind().is_sentinel() && !config.include_sentinels {
        return None;
    }

    let mut surface = node.kind().create_surface(factory);
    if config.emit_keys && !node.kind().is_text() {
        factory.set_attribute(&mut surface, config.key_attr(), &key.to_attr_value());
    }

    for &child in node.children() {
        if let Some(child_surface) = materialize(state, child, factory, config) {
            factory.append_child(&mut surface, child_surface);
        }
    }
    Some(surface)
}

/// Outcome of [`reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceUpdate {
    /// Existing surface was patched in place
    Patched,
    /// Surface is stale; the host must discard it and materialize again
    Rebuild,
}

/// Update a surface built from `prev` so it reflects `next`.
pub fn reconcile<F: SurfaceFactory + ?Sized>(
    prev: &NodeKind,
    next: &NodeKind,
    surface: &mut F::Surface,
    factory: &mut F,
) -> SurfaceUpdate {
    if NodeKind::is_stale(prev, next) {
        return SurfaceUpdate::Rebuild;
    }
    NodeKind::patch_surface(prev, next, surface, factory);
    SurfaceUpdate::Patched
}

// =============================================================================
// HTML surfaces
// =============================================================================

/// Rendered surface built by [`HtmlSurfaceFactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlSurface {
    Element {
        tag: String,
        attrs: Attrs,
        children: Vec<HtmlSurface>,
    },
    Text(String),
}

impl HtmlSurface {
    /// Tag name, `None` for text runs
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Text(_) => None,
        }
    }

    /// Attribute value on an element surface
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attrs, .. } => attrs.get_attr(name),
            Self::Text(_) => None,
        }
    }

    /// Child surfaces
    pub fn children(&self) -> &[HtmlSurface] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }

    /// Serialize to an HTML string.
    pub fn to_html(&self) -> String {
        let mut output = String::new();
        self.write_html(&mut output);
        output
    }

    fn write_html(&self, output: &mut String) {
        match self {
            Self::Text(content) => output.push_str(&escape_html(content)),
            Self::Element {
                tag,
                attrs,
                children,
            } => {
                output.push('<');
                output.push_str(tag);
                render_attrs(attrs, output);

                if is_void_element(tag) {
                    output.push_str(" />");
                    return;
                }
                output.push('>');
                for child in children {
                    child.write_html(output);
                }
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
        }
    }
}

/// Factory producing [`HtmlSurface`] trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlSurfaceFactory;

impl SurfaceFactory for HtmlSurfaceFactory {
    type Surface = HtmlSurface;

    fn create_element(&mut self, tag: &str) -> HtmlSurface {
        HtmlSurface::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    fn create_text(&mut self, content: &str) -> HtmlSurface {
        HtmlSurface::Text(content.to_string())
    }

    fn set_attribute(&mut self, surface: &mut HtmlSurface, name: &str, value: &str) {
        if let HtmlSurface::Element { attrs, .. } = surface {
            attrs.set_attr(name, value);
        }
    }

    fn remove_attribute(&mut self, surface: &mut HtmlSurface, name: &str) {
        if let HtmlSurface::Element { attrs, .. } = surface {
            attrs.remove_attr(name);
        }
    }

    fn set_text(&mut self, surface: &mut HtmlSurface, content: &str) {
        match surface {
            HtmlSurface::Text(text) => {
                text.clear();
                text.push_str(content);
            }
            HtmlSurface::Element { children, .. } => {
                *children = vec![HtmlSurface::Text(content.to_string())];
            }
        }
    }

    fn append_child(&mut self, parent: &mut HtmlSurface, child: HtmlSurface) {
        if let HtmlSurface::Element { children, .. } = parent {
            children.push(child);
        }
    }
}

// =============================================================================
// Document Rendering
// =============================================================================

/// Render the document content (children of the root) to HTML.
pub fn render_html(state: &EditorState, config: &RenderConfig) -> String {
    let mut factory = HtmlSurfaceFactory;
    let mut output = String::new();
    for &child in state.children_of(state.root()) {
        if let Some(surface) = materialize(state, child, &mut factory, config) {
            surface.write_html(&mut output);
        }
    }
    output
}

/// Render attributes to HTML.
fn render_attrs(attrs: &Attrs, output: &mut String) {
    for (name, value) in attrs.iter() {
        output.push(' ');
        output.push_str(name);
        output.push_str("=\"");
        output.push_str(&escape_attr(value));
        output.push('"');
    }
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape attribute value special characters.
fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Check if element is a void element (self-closing).
pub(crate) fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ContainerNode, ImageNode, LinkNode, SentinelNode, TextNode};
    use crate::tree::Editor;
    use crate::DocResult;

    #[test]
    fn test_escape() {
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_html_surface_serialization() {
        let mut factory = HtmlSurfaceFactory;
        let mut p = factory.create_element("p");
        factory.set_attribute(&mut p, "style", "color: red");
        let text = factory.create_text("a < b");
        factory.append_child(&mut p, text);
        let br = factory.create_element("br");
        factory.append_child(&mut p, br);

        assert_eq!(p.to_html(), "<p style=\"color: red\">a &lt; b<br /></p>");
    }

    #[test]
    fn test_render_document() -> DocResult<()> {
        let mut editor = Editor::new();
        let root = editor.root();
        editor.update(|tx| {
            let p = tx.append(root, ContainerNode::new("p"))?;
            tx.append(p, TextNode::new("hello"))?;
            tx.append(p, LinkNode::new("https://example.com", "site"))?;
            tx.append(root, ImageNode::new("cat.png"))?;
            tx.append(root, SentinelNode::bottom())?;
            Ok(())
        })?;

        let html = render_html(editor.state(), &RenderConfig::PROD);
        assert_eq!(
            html,
            "<p>hello<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">site</a></p>\
             <img src=\"cat.png\" alt=\"\" />"
        );
        Ok(())
    }

    #[test]
    fn test_dev_config_emits_keys_and_sentinels() -> DocResult<()> {
        let mut editor = Editor::new();
        let root = editor.root();
        let (p, sentinel) = editor.update(|tx| {
            let p = tx.append(root, ContainerNode::new("p"))?;
            let s = tx.append(root, SentinelNode::top())?;
            Ok((p, s))
        })?;

        let mut factory = HtmlSurfaceFactory;
        let config = RenderConfig::DEV.with_key_attr("data-k");
        let surface = materialize(editor.state(), p, &mut factory, &config);
        let expected_key = p.to_attr_value();
        assert_eq!(
            surface.as_ref().and_then(|s| s.attr("data-k")),
            Some(expected_key.as_str())
        );

        assert!(materialize(editor.state(), sentinel, &mut factory, &config).is_some());
        assert!(materialize(editor.state(), sentinel, &mut factory, &RenderConfig::PROD).is_none());
        Ok(())
    }

    #[test]
    fn test_reconcile_patches_style_but_rebuilds_on_tag_change() {
        let mut factory = HtmlSurfaceFactory;
        let prev = NodeKind::from(ContainerNode::new("div").with_style("color: red"));
        let mut surface = prev.create_surface(&mut factory);

        let restyled = NodeKind::from(ContainerNode::new("div").with_style("color: blue"));
        assert_eq!(
            reconcile(&prev, &restyled, &mut surface, &mut factory),
            SurfaceUpdate::Patched
        );
        assert_eq!(surface.attr("style"), Some("color: blue"));

        let retagged = NodeKind::from(ContainerNode::new("section"));
        assert_eq!(
            reconcile(&restyled, &retagged, &mut surface, &mut factory),
            SurfaceUpdate::Rebuild
        );
    }

    #[test]
    fn test_key_attr_default() {
        assert_eq!(RenderConfig::DEV.key_attr(), DEFAULT_KEY_ATTR);
        assert_eq!(RenderConfig::new(true, false).key_attr(), "data-node-key");
    }
}
