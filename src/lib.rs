//! tola-doctree - Editable document tree with markup import
//!
//! ## Core Concepts
//!
//! **Typed nodes**: every node carries a payload from a closed set of
//! variants ([`NodeKind`]). Children-capable variants implement
//! [`ElementLike`](node::ElementLike), opaque leaves implement
//! [`Decorator`](node::Decorator). Parents validate every child they are
//! given; nothing is coerced.
//!
//! **Copy-on-write transactions**: the [`Editor`] owns an arena of shared
//! nodes. Mutation happens in a [`Transaction`](tree::Transaction) that
//! copies nodes on first write, so snapshots taken earlier never change.
//!
//! **Markup import**: raw HTML is parsed with html5ever and walked into
//! typed nodes. Unsupported tags become visible placeholders.
//!
//! **Two serialization contracts**: versioned structured records (JSON),
//! and reconstruction from an external tree through priority-ranked
//! conversion rules (paste).
//!
//! ## Modules
//! - `node` / `nodes`: the node model and the built-in variants
//! - `tree`: committed state, transactions, editor
//! - `import`: markup import engine
//! - `serialize`: structured records
//! - `registry`: type registry and DOM conversion rules
//! - `render`: surface factories and HTML rendering
//! - `store` / `checkpoint`: chunked persistence
//! - `upload`: markup file uploads
//!
//! ## Usage
//!
//! ```ignore
//! use tola_doctree::prelude::*;
//!
//! let mut editor = Editor::new();
//! let stats = editor.import_markup("<h1>Title</h1><p>Body</p>")?;
//!
//! let record = editor.export()?;
//! let json = to_json(&record)?;
//!
//! let html = editor.to_html(&RenderConfig::PROD);
//! ```

// Macros first: they are textually scoped
#[macro_use]
mod macros;

// =============================================================================
// Modules
// =============================================================================

/// Error types
pub mod error;

/// Process-local node identity
pub mod id;

/// Deterministic content fingerprints
pub mod hash;

/// Attribute lists of source elements
pub mod attr;

/// Node model: NodeType, NodeKind, Node, capability traits
pub mod node;

/// Built-in node variants
pub mod nodes;

/// Type registry and DOM conversion rules
pub mod registry;

/// Surface factories and HTML rendering
pub mod render;

/// Untyped markup trees and the html5ever bridge
pub mod convert;

/// Structured records
pub mod serialize;

/// Document tree: state, transactions, editor
pub mod tree;

/// Markup import engine
pub mod import;

/// Chunk stores
pub mod store;

/// Chunked checkpoints
pub mod checkpoint;

/// Markup file uploads
pub mod upload;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Node model
pub use node::{Node, NodeKind, NodeType};

// Tree
pub use tree::{Editor, EditorState, Transaction};

// Import
pub use import::{ImportConfig, ImportStats, MarkupImporter, import_markup};

// Serialization
pub use serialize::StructuredRecord;

// Registry
pub use registry::Registry;

// Identity
pub use id::NodeKey;

// Error types
pub use error::{DocError, DocResult};

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportCause;
    use crate::nodes::{
        ContainerNode, ImageNode, LinkNode, TableCellNode, TableNode, TableRowNode, TextNode,
    };
    use crate::render::RenderConfig;

    fn imported(html: &str) -> Editor {
        let mut editor = Editor::new();
        editor.import_markup(html).unwrap();
        editor
    }

    fn only_child(editor: &Editor) -> &Node {
        let state = editor.state();
        let children = state.children_of(state.root());
        assert_eq!(children.len(), 1, "expected exactly one top-level node");
        state.get(children[0]).unwrap()
    }

    fn tag_of(node: &Node) -> Option<&str> {
        node.get::<ContainerNode>().map(|c| c.tag.as_str())
    }

    fn heading(state: &EditorState, node: &Node, level: u8) -> bool {
        node.get::<ContainerNode>().and_then(|c| c.heading_level()) == Some(level)
            && state.text_content(node.key()) == "Heading"
    }

    #[test]
    fn test_single_element_mapping() {
        type Check = fn(&EditorState, &Node) -> bool;
        let list: Check = |state, node| {
            let items = node.children();
            items.len() == 2
                && items
                    .iter()
                    .all(|&k| state.get(k).and_then(tag_of) == Some("li"))
                && state.text_content(node.key()) == "ab"
        };
        let cases: [(&str, Check); 13] = [
            (r#"<p style="margin: 0">x</p>"#, |_, node| {
                node.get::<ContainerNode>()
                    .is_some_and(|c| c.tag == "p" && c.style == "margin: 0")
            }),
            ("<div>x</div>", |_, node| tag_of(node) == Some("div")),
            ("<span>x</span>", |_, node| tag_of(node) == Some("span")),
            ("<h1>Heading</h1>", |state, node| heading(state, node, 1)),
            ("<h2>Heading</h2>", |state, node| heading(state, node, 2)),
            ("<h3>Heading</h3>", |state, node| heading(state, node, 3)),
            ("<ul><li>a</li><li>b</li></ul>", list),
            ("<ol><li>a</li><li>b</li></ol>", list),
            ("<table><tr><td>c</td></tr></table>", |_, node| node.is::<TableNode>()),
            (r#"<img src="cat.png">"#, |_, node| {
                node.get::<ImageNode>().map(|i| i.src.as_str()) == Some("cat.png")
            }),
            (r#"<a href="https://example.com">Example</a>"#, |_, node| {
                node.get::<LinkNode>() == Some(&LinkNode::new("https://example.com", "Example"))
            }),
            ("<hr>", |state, node| {
                tag_of(node) == Some("p")
                    && state.text_content(node.key()) == import::DEFAULT_RULE_TEXT
            }),
            ("<br>", |_, node| tag_of(node) == Some("br") && node.children().is_empty()),
        ];

        for (html, check) in cases {
            let editor = imported(html);
            assert!(check(editor.state(), only_child(&editor)), "unexpected mapping for {html}");
        }
    }

    #[test]
    fn test_structured_round_trip() -> DocResult<()> {
        let source = imported(concat!(
            r#"<h1>Title</h1><p style="color: red">Hi <span>there</span><br></p>"#,
            r#"<ul><li>a</li><li>b</li></ul><table><tr><th>h</th></tr><tr><td>d</td></tr></table>"#,
            r#"<img src="i.png"><a href="mailto:x@y.z">mail</a><hr><blink>old</blink>"#,
        ));
        let record = source.export()?;
        let json = serialize::to_json(&record)?;

        let mut target = Editor::new();
        target.load_structured(&serialize::from_json(&json)?)?;

        assert_eq!(target.export()?, record);
        assert_eq!(
            target.state().fingerprint(target.root())?,
            source.state().fingerprint(source.root())?
        );
        assert_eq!(
            target.to_html(&RenderConfig::PROD),
            source.to_html(&RenderConfig::PROD)
        );
        Ok(())
    }

    #[test]
    fn test_import_is_idempotent() -> DocResult<()> {
        let html = "<p>one <span>two</span></p><table><tr><td>x</td></tr></table><foo>bar</foo>";
        let mut editor = Editor::new();
        editor.import_markup(html)?;
        let first = editor.snapshot();
        editor.import_markup(html)?;

        let second = editor.state();
        assert_eq!(first.fingerprint(first.root())?, second.fingerprint(second.root())?);
        // Fresh keys on the second run
        assert_ne!(first.children_of(first.root()), second.children_of(second.root()));
        Ok(())
    }

    #[test]
    fn test_table_flattening() -> DocResult<()> {
        let editor = imported(
            "<table><tr><td>a</td></tr><tr><td>b</td><th>c</th></tr></table>",
        );
        let state = editor.state();
        let table = state.children_of(state.root())[0];
        let rows = state.children_of(table);
        assert_eq!(rows.len(), 2);

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|&row| {
                assert!(state.node(row).is_ok_and(|n| n.is::<TableRowNode>()));
                state
                    .children_of(row)
                    .iter()
                    .map(|&cell| {
                        assert!(state.node(cell).is_ok_and(|n| n.is::<TableCellNode>()));
                        state.text_content(cell)
                    })
                    .collect()
            })
            .collect();
        assert_eq!(cells, [vec!["a"], vec!["b", "c"]]);
        Ok(())
    }

    #[test]
    fn test_unsupported_tag_placeholder() -> DocResult<()> {
        let mut editor = Editor::new();
        let stats = editor.import_markup("<p><foo>bar</foo></p>")?;
        assert_eq!(stats.unsupported, 1);

        let state = editor.state();
        let placeholder = state
            .descendants(state.root())
            .find(|n| {
                n.get::<TextNode>()
                    .is_some_and(|t| t.text.contains("foo") && t.text.contains("not supported"))
            });
        assert!(placeholder.is_some());
        assert!(state.text_content(state.root()).contains("bar"));
        Ok(())
    }

    #[test]
    fn test_missing_required_attributes_dropped() -> DocResult<()> {
        let mut editor = Editor::new();
        let stats = editor.import_markup(r#"<img><img src=""><a>text</a><a href=" ">x</a>"#)?;
        assert!(editor.state().children_of(editor.root()).is_empty());
        assert_eq!(stats.dropped, 4);
        assert!(stats.is_empty());
        Ok(())
    }

    #[test]
    fn test_whitespace_text_dropped() -> DocResult<()> {
        let mut editor = Editor::new();
        let stats = editor.import_markup("<div>\n   <p>  x  </p>\n\t</div>")?;
        let state = editor.state();
        let div = state.children_of(state.root())[0];
        assert_eq!(state.children_of(div).len(), 1);
        assert_eq!(state.text_content(div), "x");
        assert!(stats.whitespace_dropped >= 2);
        Ok(())
    }

    #[test]
    fn test_snapshot_survives_reimport() -> DocResult<()> {
        let mut editor = imported("<p>before</p>");
        let snapshot = editor.snapshot();
        editor.import_markup("<h1>after</h1>")?;

        assert_eq!(snapshot.text_content(snapshot.root()), "before");
        assert_eq!(editor.state().text_content(editor.root()), "after");
        Ok(())
    }

    #[test]
    fn test_import_into_leaf_fails() {
        let mut editor = imported("<p>previous</p>");
        let root = editor.root();

        // A link has no children to clear.
        let result = editor.update(|tx| {
            let link = tx.append(root, LinkNode::new("/", "x"))?;
            import_markup(tx, link, "<p>new</p>")
        });
        assert!(matches!(result, Err(DocError::ImportFailure(ImportCause::Structure(_)))));

        // Work done before the failure was committed; the link is untouched.
        let state = editor.state();
        assert_eq!(state.children_of(root).len(), 2);
    }

    #[test]
    fn test_import_then_paste() -> DocResult<()> {
        let mut editor = imported("<p>doc</p>");
        let root = editor.root();
        editor.paste_html(root, "<section><p>pasted</p></section>")?;
        assert_eq!(
            editor.to_html(&RenderConfig::PROD),
            "<p>doc</p><section><p>pasted</p></section>"
        );
        Ok(())
    }

    #[test]
    fn test_editor_is_send_sync() {
        static_assertions::assert_impl_all!(Editor: Send, Sync);
        static_assertions::assert_impl_all!(EditorState: Send, Sync, Clone);
    }
}
