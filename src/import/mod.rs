//! Markup import
//!
//! Replaces the content of a root with typed nodes built from markup.
//!
//! # Tag mapping
//!
//! | Source | Result | Recurses |
//! |--------|--------|----------|
//! | text | `TextNode` (trimmed; whitespace-only dropped) | – |
//! | `p` `div` `span` | `ContainerNode` (tag, style) | yes |
//! | `h1`–`h3` | `ContainerNode` with the trimmed text content | no |
//! | `ul` `ol` | list `ContainerNode`, one `li` per direct `li` child, text only | no |
//! | `table` | `TableNode`, a row per descendant `tr`, a cell per descendant `td`/`th` | no |
//! | `img` | `ImageNode`, dropped without `src` | no |
//! | `a` | `LinkNode`, dropped without `href` | no |
//! | `hr` | `p` holding [`ImportConfig::rule_text`] | no |
//! | `br` | inline `br` container | no |
//! | anything else | `p` placeholder reading `[tag not supported]` | yes |
//!
//! Row and cell lookup matches at any depth, so a table nested in a cell
//! contributes its rows to the outer table.
//!
//! The walk keeps its own worklist; nesting depth is bounded by the parser
//! ([`MAX_NESTING_DEPTH`](crate::convert::MAX_NESTING_DEPTH)).
//!
//! # Failure
//!
//! The root is cleared before the walk. If the walk fails, the working set
//! rolls back to the cleared root and the error is returned as
//! `ImportFailure`: the root is left empty, never half-populated.

mod config;

pub use config::{DEFAULT_RULE_TEXT, ImportConfig, ImportStats};

use std::io::Read;

use crate::convert::{SourceDocument, SourceElement, SourceNode, parse_html, read_html};
use crate::error::{DocError, DocResult, ImportCause};
use crate::id::NodeKey;
use crate::node::NodeKind;
use crate::nodes::{ContainerNode, ImageNode, LinkNode, TableCellNode, TableNode, TableRowNode, TextNode};
use crate::tree::Transaction;

// =============================================================================
// Entry points
// =============================================================================

/// Import markup text into `root` with the default configuration.
pub fn import_markup(
    tx: &mut Transaction<'_>,
    root: NodeKey,
    raw: &str,
) -> DocResult<ImportStats> {
    MarkupImporter::new().import(tx, root, raw)
}

/// Import markup bytes into `root` with the default configuration.
pub fn import_markup_bytes<R: Read>(
    tx: &mut Transaction<'_>,
    root: NodeKey,
    reader: &mut R,
) -> DocResult<ImportStats> {
    MarkupImporter::new().import_bytes(tx, root, reader)
}

// =============================================================================
// MarkupImporter
// =============================================================================

/// Configured markup importer
#[derive(Debug, Clone, Default)]
pub struct MarkupImporter {
    config: ImportConfig,
}

impl MarkupImporter {
    /// Importer with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Importer with a custom configuration
    pub fn with_config(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Parse `raw` and replace the content of `root` with it.
    pub fn import(
        &self,
        tx: &mut Transaction<'_>,
        root: NodeKey,
        raw: &str,
    ) -> DocResult<ImportStats> {
        self.import_document(tx, root, &parse_html(raw))
    }

    /// Read markup from `reader` and replace the content of `root` with it.
    ///
    /// A read failure leaves `root` untouched.
    pub fn import_bytes<R: Read>(
        &self,
        tx: &mut Transaction<'_>,
        root: NodeKey,
        reader: &mut R,
    ) -> DocResult<ImportStats> {
        let document = read_html(reader).inspect_err(|err| {
            tracing::error!(error = %err, "markup import aborted before clearing the root");
        })?;
        self.import_document(tx, root, &document)
    }

    /// Replace the content of `root` with an already parsed document.
    ///
    /// Fails with `ImportFailure(MissingBody)` (root untouched) if the
    /// document has no body.
    pub fn import_document(
        &self,
        tx: &mut Transaction<'_>,
        root: NodeKey,
        document: &SourceDocument,
    ) -> DocResult<ImportStats> {
        let body = document
            .body()
            .ok_or(DocError::ImportFailure(ImportCause::MissingBody))?;

        tx.clear(root).map_err(DocError::import_failure)?;
        let savepoint = tx.savepoint();

        let mut walker = Walker::new(&self.config);
        match walker.walk(tx, body, root) {
            Ok(()) => {
                let stats = walker.stats;
                tracing::info!(
                    nodes = stats.nodes,
                    unsupported = stats.unsupported,
                    dropped = stats.dropped,
                    "markup import completed"
                );
                Ok(stats)
            }
            Err(err) => {
                tx.rollback_to(savepoint);
                tracing::error!(error = %err, "markup import aborted, root left empty");
                Err(DocError::import_failure(err))
            }
        }
    }
}

// =============================================================================
// Walker
// =============================================================================

/// Source-to-node walk over an explicit worklist
struct Walker<'c> {
    config: &'c ImportConfig,
    stats: ImportStats,
}

impl<'c> Walker<'c> {
    fn new(config: &'c ImportConfig) -> Self {
        Self {
            config,
            stats: ImportStats::default(),
        }
    }

    /// Walk the children of `source` into `parent`, in document order.
    fn walk(
        &mut self,
        tx: &mut Transaction<'_>,
        source: &SourceElement,
        parent: NodeKey,
    ) -> DocResult<()> {
        let mut stack = vec![(parent, source.children.iter())];
        while let Some((target, siblings)) = stack.last_mut() {
            let target = *target;
            match siblings.next() {
                Some(SourceNode::Text(text)) => self.text(tx, target, text)?,
                Some(SourceNode::Element(element)) => {
                    if let Some(open) = self.element(tx, target, element)? {
                        stack.push((open, element.children.iter()));
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    fn text(&mut self, tx: &mut Transaction<'_>, parent: NodeKey, text: &str) -> DocResult<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.stats.whitespace_dropped += 1;
            return Ok(());
        }
        self.append(tx, parent, TextNode::new(trimmed))?;
        Ok(())
    }

    /// Map one element. Returns the node its source children walk into,
    /// `None` for constructs that do not recurse.
    fn element(
        &mut self,
        tx: &mut Transaction<'_>,
        parent: NodeKey,
        element: &SourceElement,
    ) -> DocResult<Option<NodeKey>> {
        match element.tag.as_str() {
            "p" | "div" | "span" => self
                .append(tx, parent, ContainerNode::from_source(element))
                .map(Some),
            "h1" | "h2" | "h3" => {
                let key = self.append(tx, parent, ContainerNode::from_source(element))?;
                self.flat_text(tx, key, element)?;
                Ok(None)
            }
            "ul" | "ol" => self.list(tx, parent, element).map(|()| None),
            "table" => self.table(tx, parent, element).map(|()| None),
            "img" => {
                match ImageNode::from_source(element) {
                    Some(image) => {
                        self.append(tx, parent, image)?;
                    }
                    None => self.dropped(element, "src"),
                }
                Ok(None)
            }
            "a" => {
                match LinkNode::from_source(element) {
                    Some(link) => {
                        self.append(tx, parent, link)?;
                    }
                    None => self.dropped(element, "href"),
                }
                Ok(None)
            }
            "hr" => {
                let key = self.append(tx, parent, ContainerNode::new("p"))?;
                let rule = TextNode::new(self.config.rule_text.as_str());
                self.append(tx, key, rule)?;
                Ok(None)
            }
            "br" => {
                self.append(tx, parent, ContainerNode::line_break())?;
                Ok(None)
            }
            _ => self.unsupported(tx, parent, element).map(Some),
        }
    }

    /// Give `key` a single text child: the element's trimmed text content.
    fn flat_text(
        &mut self,
        tx: &mut Transaction<'_>,
        key: NodeKey,
        element: &SourceElement,
    ) -> DocResult<()> {
        let content = element.text_content();
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            self.append(tx, key, TextNode::new(trimmed))?;
        }
        Ok(())
    }

    fn list(
        &mut self,
        tx: &mut Transaction<'_>,
        parent: NodeKey,
        element: &SourceElement,
    ) -> DocResult<()> {
        let list = self.append(tx, parent, ContainerNode::from_source(element))?;
        for item in element.child_elements().filter(|e| e.tag == "li") {
            let key = self.append(tx, list, ContainerNode::from_source(item))?;
            self.flat_text(tx, key, item)?;
        }
        Ok(())
    }

    fn table(
        &mut self,
        tx: &mut Transaction<'_>,
        parent: NodeKey,
        element: &SourceElement,
    ) -> DocResult<()> {
        let table = self.append(tx, parent, TableNode::default())?;
        self.stats.tables += 1;
        for row in element.descendants_by_tag(&["tr"]) {
            let row_key = self.append(tx, table, TableRowNode::default())?;
            self.stats.rows += 1;
            for cell in row.descendants_by_tag(&["td", "th"]) {
                let cell_key = self.append(tx, row_key, TableCellNode::default())?;
                self.stats.cells += 1;
                self.flat_text(tx, cell_key, cell)?;
            }
        }
        Ok(())
    }

    /// Placeholder paragraph; the element's children walk into it.
    fn unsupported(
        &mut self,
        tx: &mut Transaction<'_>,
        parent: NodeKey,
        element: &SourceElement,
    ) -> DocResult<NodeKey> {
        tracing::warn!(tag = %element.tag, "unsupported tag replaced with placeholder");
        self.stats.unsupported += 1;

        let placeholder = ContainerNode::new("p").with_style(self.config.placeholder_style.as_str());
        let key = self.append(tx, parent, placeholder)?;
        self.append(tx, key, TextNode::new(format!("[{} not supported]", element.tag)))?;
        Ok(key)
    }

    fn dropped(&mut self, element: &SourceElement, attr: &str) {
        tracing::debug!(tag = %element.tag, attr, "element dropped for a missing attribute");
        self.stats.dropped += 1;
    }

    fn append(
        &mut self,
        tx: &mut Transaction<'_>,
        parent: NodeKey,
        payload: impl Into<NodeKind>,
    ) -> DocResult<NodeKey> {
        let kind = payload.into();
        let is_text = kind.is_text();
        let key = tx.append(parent, kind)?;
        self.stats.nodes += 1;
        if is_text {
            self.stats.texts += 1;
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;
    use crate::tree::{Editor, EditorState};

    fn import(html: &str) -> (EditorState, ImportStats) {
        let mut editor = Editor::new();
        let stats = editor.import_markup(html).unwrap();
        (editor.snapshot(), stats)
    }

    fn top_level(state: &EditorState) -> Vec<&'static str> {
        state
            .children_of(state.root())
            .iter()
            .filter_map(|&k| state.get(k))
            .map(|n| n.type_name())
            .collect()
    }

    #[test]
    fn test_paragraph_keeps_style_and_recurses() {
        let (state, stats) = import(r#"<p style="color: red">Hello <span>world</span></p>"#);
        let p = state.children_of(state.root())[0];
        let node = state.get(p).unwrap();
        let container = node.get::<ContainerNode>().unwrap();
        assert_eq!(container.tag, "p");
        assert_eq!(container.style, "color: red");
        assert_eq!(node.children().len(), 2);
        assert_eq!(state.text_content(p), "Helloworld");
        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.texts, 2);
    }

    #[test]
    fn test_heading_is_flattened() {
        let (state, _) = import("<h2>  A <em>b</em>  </h2>");
        let h = state.children_of(state.root())[0];
        let node = state.get(h).unwrap();
        assert_eq!(node.get::<ContainerNode>().map(|c| c.tag.as_str()), Some("h2"));
        assert_eq!(node.children().len(), 1);
        assert_eq!(state.text_content(h), "A b");
    }

    #[test]
    fn test_list_keeps_only_direct_items() {
        let (state, _) = import("<ul><li>one</li><li><b>two</b></li><p>skip</p></ul>");
        let list = state.children_of(state.root())[0];
        let items = state.children_of(list);
        assert_eq!(items.len(), 2);
        assert_eq!(state.text_content(items[1]), "two");
        assert_eq!(state.text_content(list), "onetwo");
    }

    #[test]
    fn test_nested_table_flattens_into_outer() {
        let (state, stats) = import(
            "<table><tr><td>a<table><tr><td>x</td></tr></table></td></tr></table>",
        );
        let table = state.children_of(state.root())[0];
        // Outer row plus the inner table's row
        assert_eq!(state.children_of(table).len(), 2);
        assert_eq!(stats.tables, 1);
        assert_eq!(stats.rows, 2);
        // The outer row also sees the inner cell as a descendant
        assert_eq!(stats.cells, 3);
        let outer_row = state.children_of(table)[0];
        assert_eq!(state.text_content(state.children_of(outer_row)[0]), "ax");
    }

    #[test]
    fn test_hr_and_br() {
        let (state, _) = import("<hr><p>a<br>b</p>");
        let root = state.root();
        let rule = state.children_of(root)[0];
        assert_eq!(state.text_content(rule), DEFAULT_RULE_TEXT);

        let p = state.children_of(root)[1];
        let br = state.get(state.children_of(p)[1]).unwrap();
        assert!(br.get::<ContainerNode>().is_some_and(|c| c.is_line_break()));
        assert!(br.children().is_empty());
    }

    #[test]
    fn test_decorators_do_not_recurse() {
        let (state, _) = import(r#"<a href="/x"><img src="i.png"></a>"#);
        assert_eq!(top_level(&state), ["link"]);
        let link = state.children_of(state.root())[0];
        assert_eq!(
            state.get(link).and_then(|n| n.get::<LinkNode>()).map(|l| l.text.as_str()),
            Some("/x")
        );
    }

    #[test]
    fn test_placeholder_style_configurable() {
        let mut editor = Editor::new();
        let importer = MarkupImporter::with_config(
            ImportConfig::new().with_placeholder_style("color: #b00"),
        );
        let stats = editor.import_markup_with(&importer, "<marquee>hi</marquee>").unwrap();
        assert_eq!(stats.unsupported, 1);
        assert!(stats.has_losses());

        let state = editor.state();
        let placeholder = state.children_of(state.root())[0];
        let node = state.get(placeholder).unwrap();
        assert_eq!(node.get::<ContainerNode>().map(|c| c.style.as_str()), Some("color: #b00"));
        assert_eq!(state.text_content(placeholder), "[marquee not supported]hi");
    }

    #[test]
    fn test_import_replaces_previous_content() {
        let mut editor = Editor::new();
        editor.import_markup("<p>first</p><p>second</p>").unwrap();
        editor.import_markup("<p>third</p>").unwrap();
        let state = editor.state();
        assert_eq!(state.text_content(state.root()), "third");
    }

    #[test]
    fn test_missing_body_leaves_root_untouched() {
        let mut editor = Editor::new();
        editor.import_markup("<p>keep</p>").unwrap();

        let root = editor.root();
        let document = SourceDocument::new(Vec::new());
        let result = editor.update(|tx| MarkupImporter::new().import_document(tx, root, &document));
        assert!(matches!(
            result,
            Err(DocError::ImportFailure(ImportCause::MissingBody))
        ));
        assert_eq!(editor.state().text_content(root), "keep");
    }

    #[test]
    fn test_walk_failure_leaves_target_cleared() {
        let mut editor = Editor::new();
        let root = editor.root();
        let row = editor
            .update(|tx| {
                let table = tx.append(root, TableNode::default())?;
                let row = tx.append(table, TableRowNode::default())?;
                tx.append(row, TableCellNode::default())?;
                Ok(row)
            })
            .unwrap();

        // A row only takes cells: the first paragraph breaks the walk.
        let result = editor.update(|tx| import_markup(tx, row, "<p>x</p>"));
        let err = result.unwrap_err();
        assert!(err.is_structural());
        assert!(matches!(err, DocError::ImportFailure(ImportCause::Structure(_))));
        assert!(editor.state().children_of(row).is_empty());
        assert_eq!(editor.state().len(), 3);
    }

    #[test]
    fn test_import_bytes() {
        let mut editor = Editor::new();
        let root = editor.root();
        let mut bytes: &[u8] = b"<body><h1>Title</h1></body>";
        let stats = editor
            .update(|tx| import_markup_bytes(tx, root, &mut bytes))
            .unwrap();
        assert_eq!(stats.nodes, 2);
        assert_eq!(
            editor.state().get(editor.state().children_of(root)[0]).map(|n| n.type_name()),
            Some(ContainerNode::TYPE)
        );
    }

    #[test]
    fn test_deeply_nested_markup() {
        let html = format!("{}x{}", "<div>".repeat(5000), "</div>".repeat(5000));
        let mut editor = Editor::new();
        let stats = editor.import_markup(&html).unwrap();
        assert_eq!(stats.nodes, 5001);

        let state = editor.state();
        assert_eq!(state.text_content(state.root()), "x");
        assert!(state.stats().max_depth < crate::convert::MAX_NESTING_DEPTH);
    }
}
