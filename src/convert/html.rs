//! Conversion from html5ever's RcDom to [`SourceDocument`]
//!
//! html5ever does the standards work: implied `<html>`/`<body>`, implied
//! `<tbody>`, misnested tags, entity decoding. It never fails on malformed
//! markup; the only failure left is reading bytes.
//!
//! Comments, doctypes and processing instructions are dropped here.

use std::io::Read;

use compact_str::CompactString;
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::{DocError, DocResult, ImportCause};

use super::{DOCUMENT_TAG, SourceDocument, SourceElement, SourceNode};

// =============================================================================
// Entry points
// =============================================================================

/// Parse markup text into a document.
pub fn parse_html(text: &str) -> SourceDocument {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(text);
    Converter::default().convert_document(&dom)
}

/// Parse markup from a byte stream (UTF-8, invalid sequences replaced).
///
/// Fails with `ImportFailure(Read)` if the reader fails.
pub fn read_html<R: Read>(reader: &mut R) -> DocResult<SourceDocument> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(reader)
        .map_err(|err| DocError::ImportFailure(ImportCause::Read(err)))?;
    Ok(Converter::default().convert_document(&dom))
}

/// Parse a markup fragment (pasted content) into its top-level nodes.
pub fn parse_fragment(text: &str) -> Vec<SourceNode> {
    let document = parse_html(text);
    document
        .body()
        .map(|body| body.children.clone())
        .unwrap_or_default()
}

// =============================================================================
// Converter
// =============================================================================

/// Deepest element nesting kept in a converted tree, the document root
/// included. Elements opened below it attach to their ancestor at this
/// depth, in document order, the way browsers cap parser depth.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Internal state for conversion
#[derive(Default)]
struct Converter {
    /// Elements converted so far
    elements: usize,
    /// Text runs converted so far
    texts: usize,
}

/// Open source handle during conversion
struct Frame {
    handle: Handle,
    /// Index of the next child to visit
    next: usize,
    /// `None` past the depth cap: children go to the nearest open element
    element: Option<SourceElement>,
}

impl Converter {
    fn convert_document(&mut self, dom: &RcDom) -> SourceDocument {
        let mut stack = vec![Frame {
            handle: dom.document.clone(),
            next: 0,
            element: Some(SourceElement::new(DOCUMENT_TAG)),
        }];
        let mut depth = 1;
        let mut root = None;

        while let Some(frame) = stack.last_mut() {
            let child = frame.handle.children.borrow().get(frame.next).cloned();
            frame.next += 1;

            let Some(child) = child else {
                let Some(Frame {
                    element: Some(element),
                    ..
                }) = stack.pop()
                else {
                    continue;
                };
                depth -= 1;
                match open_element(&mut stack) {
                    Some(parent) => parent.children.push(SourceNode::Element(element)),
                    None => root = Some(element),
                }
                continue;
            };

            match child.data {
                NodeData::Element {
                    ref name,
                    ref attrs,
                    ..
                } => {
                    self.elements += 1;
                    // Convert attributes: Vec<Attribute> -> Vec<(String, String)>
                    let attrs = attrs
                        .borrow()
                        .iter()
                        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                        .collect();
                    let element = SourceElement {
                        tag: CompactString::from(str::to_ascii_lowercase(&name.local)),
                        attrs,
                        children: Vec::new(),
                    };
                    if depth < MAX_NESTING_DEPTH {
                        depth += 1;
                        stack.push(Frame {
                            handle: child.clone(),
                            next: 0,
                            element: Some(element),
                        });
                    } else {
                        if let Some(parent) = open_element(&mut stack) {
                            parent.children.push(SourceNode::Element(element));
                        }
                        stack.push(Frame {
                            handle: child.clone(),
                            next: 0,
                            element: None,
                        });
                    }
                }
                NodeData::Text { ref contents } => {
                    self.texts += 1;
                    if let Some(parent) = open_element(&mut stack) {
                        parent.children.push(SourceNode::Text(contents.borrow().to_string()));
                    }
                }
                _ => {}
            }
        }

        tracing::trace!(
            elements = self.elements,
            texts = self.texts,
            "parsed markup document"
        );
        SourceDocument::new(root.map(|r| r.children).unwrap_or_default())
    }
}

/// Innermost frame that owns an element
fn open_element(stack: &mut [Frame]) -> Option<&mut SourceElement> {
    stack.iter_mut().rev().find_map(|frame| frame.element.as_mut())
}
