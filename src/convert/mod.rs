//! Untyped markup trees
//!
//! Parsers produce a [`SourceDocument`]: plain elements and text, no
//! comments or doctypes. The importer and the reconstruction rules read
//! only this shape, so they work the same for parsed HTML and for trees a
//! host builds by hand (e.g. from a clipboard DOM).
//!
//! # Flow
//!
//! ```text
//! raw markup ──html::parse_html()──▶ SourceDocument
//!                                        │
//!          ┌─────────────────────────────┴──────────────────────┐
//!          ▼ import::import_markup()                           ▼ Registry::reconstruct()
//!   root cleared and repopulated                      nodes appended under a parent
//! ```

pub mod html;

pub use html::{MAX_NESTING_DEPTH, parse_fragment, parse_html, read_html};

use compact_str::CompactString;

use crate::attr::{Attrs, AttrsExt};

// =============================================================================
// SourceNode
// =============================================================================

/// Node of an untyped markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceNode {
    Element(SourceElement),
    Text(String),
}

impl SourceNode {
    /// Get as element reference.
    pub fn as_element(&self) -> Option<&SourceElement> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }

    /// Check if this is whitespace-only text
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(t) if t.trim().is_empty())
    }
}

// =============================================================================
// SourceElement
// =============================================================================

/// Element of an untyped markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceElement {
    /// Tag name, lower-cased
    pub tag: CompactString,
    /// Attributes in source order
    pub attrs: Attrs,
    /// Children in source order
    pub children: Vec<SourceNode>,
}

impl SourceElement {
    /// Create an empty element
    pub fn new(tag: &str) -> Self {
        Self {
            tag: CompactString::from(tag.to_ascii_lowercase()),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.set_attr(name, value);
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: SourceElement) -> Self {
        self.children.push(SourceNode::Element(child));
        self
    }

    /// Builder: append a text child
    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(SourceNode::Text(text.to_string()));
        self
    }

    /// Direct child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &SourceElement> {
        self.children.iter().filter_map(SourceNode::as_element)
    }

    /// Concatenated text of all descendant text nodes, in document order
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        let mut stack = vec![self.children.iter()];
        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some(SourceNode::Text(t)) => text.push_str(t),
                Some(SourceNode::Element(e)) => stack.push(e.children.iter()),
                None => {
                    stack.pop();
                }
            }
        }
        text
    }

    /// All descendant elements (excluding `self`), depth-first in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self)
    }

    /// Descendant elements whose tag is one of `tags`, in document order.
    ///
    /// Matches at any depth, including inside nested matches.
    pub fn descendants_by_tag<'a>(
        &'a self,
        tags: &'a [&'a str],
    ) -> impl Iterator<Item = &'a SourceElement> + 'a {
        self.descendants()
            .filter(move |e| tags.contains(&e.tag.as_str()))
    }

    /// First element with `tag`, `self` included (depth-first)
    pub fn find(&self, tag: &str) -> Option<&SourceElement> {
        if self.tag == tag {
            return Some(self);
        }
        self.descendants().find(|e| e.tag == tag)
    }
}

// =============================================================================
// Descendants - depth-first element traversal
// =============================================================================

/// Depth-first iterator over descendant elements
pub struct Descendants<'a> {
    stack: Vec<&'a SourceElement>,
}

impl<'a> Descendants<'a> {
    fn new(root: &'a SourceElement) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_children(root);
        iter
    }

    fn push_children(&mut self, elem: &'a SourceElement) {
        // Push children in reverse order so they're visited left-to-right
        for child in elem.children.iter().rev() {
            if let SourceNode::Element(e) = child {
                self.stack.push(e);
            }
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SourceElement;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.stack.pop()?;
        self.push_children(elem);
        Some(elem)
    }
}

// =============================================================================
// SourceDocument
// =============================================================================

/// Parsed markup document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Synthetic root holding the top-level nodes (normally one `<html>`)
    pub root: SourceElement,
}

/// Tag of the synthetic document root.
pub const DOCUMENT_TAG: &str = "#document";

impl SourceDocument {
    /// Wrap top-level nodes in a document
    pub fn new(children: Vec<SourceNode>) -> Self {
        let mut root = SourceElement::new(DOCUMENT_TAG);
        root.children = children;
        Self { root }
    }

    /// The `<body>` element, if the document has one
    pub fn body(&self) -> Option<&SourceElement> {
        self.root.find("body")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceElement {
        SourceElement::new("div")
            .with_child(SourceElement::new("p").with_text("one "))
            .with_child(
                SourceElement::new("section")
                    .with_child(SourceElement::new("p").with_text("two"))
                    .with_text(" three"),
            )
    }

    #[test]
    fn test_text_content() {
        assert_eq!(sample().text_content(), "one two three");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = sample();
        let tags: Vec<_> = root.descendants().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, ["p", "section", "p"]);

        let ps = root.descendants_by_tag(&["p"]).count();
        assert_eq!(ps, 2);
    }

    #[test]
    fn test_tag_lowercased() {
        assert_eq!(SourceElement::new("DIV").tag, "div");
    }

    #[test]
    fn test_body_lookup() {
        let doc = SourceDocument::new(vec![SourceNode::Element(
            SourceElement::new("html")
                .with_child(SourceElement::new("head"))
                .with_child(SourceElement::new("body").with_text("x")),
        )]);
        assert_eq!(doc.body().map(|b| b.text_content()), Some("x".to_string()));

        let empty = SourceDocument::new(Vec::new());
        assert!(empty.body().is_none());
    }
}
