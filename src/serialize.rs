//! Structured (JSON) export and import
//!
//! Every node maps to one [`StructuredRecord`]:
//!
//! ```json
//! { "type": "styled-element", "version": 2, "style": "", "tag": "p",
//!   "children": [ { "type": "text", "version": 1, "text": "hi" } ] }
//! ```
//!
//! - `type` / `version` identify the variant and its schema
//! - payload fields sit next to them (flattened)
//! - element variants always carry `children`, leaves never do
//!
//! Sentinels are skipped when a parent exports its children. Keys are not
//! part of the format; importing always issues fresh keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocError, DocResult};
use crate::id::NodeKey;
use crate::node::NodeKind;
use crate::registry::Registry;
use crate::tree::{EditorState, Transaction};

/// Payload fields of a record (everything except `type`/`version`/`children`)
pub type RecordFields = serde_json::Map<String, Value>;

// =============================================================================
// StructuredRecord
// =============================================================================

/// Versioned structured record of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    /// Type discriminator
    #[serde(rename = "type")]
    pub node_type: String,

    /// Schema version the record was written with
    pub version: u32,

    /// Child records; present exactly for element variants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<StructuredRecord>>,

    /// Payload fields
    #[serde(flatten)]
    pub fields: RecordFields,
}

impl StructuredRecord {
    /// Record of a single payload, without children
    pub fn from_kind(kind: &NodeKind) -> DocResult<Self> {
        let mut fields = kind.export_fields()?;
        // Payload fields never shadow the envelope.
        for reserved in ["type", "version", "children"] {
            fields.remove(reserved);
        }
        Ok(Self {
            node_type: kind.type_name().to_string(),
            version: kind.version(),
            children: kind.is_element().then(Vec::new),
            fields,
        })
    }

    /// Child records (empty for leaves)
    pub fn children(&self) -> &[StructuredRecord] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Total number of records in this subtree
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Self::count).sum::<usize>()
    }
}

// =============================================================================
// Export
// =============================================================================

/// Export the subtree rooted at `key`.
pub fn export_node(state: &EditorState, key: NodeKey) -> DocResult<StructuredRecord> {
    let node = state.node(key)?;
    let mut record = StructuredRecord::from_kind(node.kind())?;
    if let Some(children) = record.children.as_mut() {
        for &child in node.children() {
            if state.node(child)?.kind().is_sentinel() {
                continue;
            }
            children.push(export_node(state, child)?);
        }
    }
    Ok(record)
}

/// Encode a record as compact JSON
pub fn to_json(record: &StructuredRecord) -> DocResult<String> {
    Ok(serde_json::to_string(record)?)
}

/// Encode a record as indented JSON
pub fn to_json_pretty(record: &StructuredRecord) -> DocResult<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Decode a record from JSON
pub fn from_json(json: &str) -> DocResult<StructuredRecord> {
    Ok(serde_json::from_str(json)?)
}

// =============================================================================
// Import
// =============================================================================

/// Import one record (and its subtree) as the last child of `parent`.
///
/// Fails with `UnknownType`, `UnsupportedVersion`, `InvalidRecord`, or
/// `StructuralViolation` (leaf record with children, or a child the parent
/// does not accept).
pub fn import_record(
    tx: &mut Transaction<'_>,
    registry: &Registry,
    parent: NodeKey,
    record: &StructuredRecord,
) -> DocResult<NodeKey> {
    let kind = registry.import_record(record)?;
    let is_element = kind.is_element();
    if !is_element && !record.children().is_empty() {
        return Err(DocError::StructuralViolation(format!(
            "`{}` record cannot carry children",
            record.node_type
        )));
    }

    let key = tx.append(parent, kind)?;
    for child in record.children() {
        import_record(tx, registry, key, child)?;
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ContainerNode, ImageNode, SentinelNode, TableNode, TextNode};
    use crate::tree::Editor;
    use serde_json::json;

    fn record(value: Value) -> StructuredRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_record_shape() -> DocResult<()> {
        let mut editor = Editor::new();
        let root = editor.root();
        editor.update(|tx| {
            let p = tx.append(root, ContainerNode::new("p"))?;
            tx.append(p, TextNode::new("hi"))?;
            tx.append(root, ImageNode::new("a.png"))?;
            Ok(())
        })?;

        let value = serde_json::to_value(editor.export()?)?;
        assert_eq!(
            value,
            json!({
                "type": "root",
                "version": 1,
                "children": [
                    {
                        "type": "styled-element",
                        "version": 2,
                        "style": "",
                        "tag": "p",
                        "children": [{ "type": "text", "version": 1, "text": "hi" }]
                    },
                    { "type": "image", "version": 1, "src": "a.png" }
                ]
            })
        );
        Ok(())
    }

    #[test]
    fn test_empty_element_keeps_children_array() -> DocResult<()> {
        let mut editor = Editor::new();
        let root = editor.root();
        let table = editor.update(|tx| tx.append(root, TableNode::default()))?;

        let exported = export_node(editor.state(), table)?;
        assert_eq!(exported.children, Some(Vec::new()));
        assert!(to_json(&exported)?.contains("\"children\":[]"));
        Ok(())
    }

    #[test]
    fn test_sentinels_not_exported() -> DocResult<()> {
        let mut editor = Editor::new();
        let root = editor.root();
        editor.update(|tx| {
            tx.append(root, SentinelNode::top())?;
            tx.append(root, TextNode::new("body"))?;
            tx.append(root, SentinelNode::bottom())?;
            Ok(())
        })?;

        let exported = editor.export()?;
        assert_eq!(exported.children().len(), 1);
        assert_eq!(exported.children()[0].node_type, "text");
        Ok(())
    }

    #[test]
    fn test_unknown_fields_ignored() -> DocResult<()> {
        let registry = Registry::with_builtins();
        let mut editor = Editor::new();
        let root = editor.root();
        let rec = record(json!({
            "type": "text", "version": 1, "text": "x",
            "format": 0, "indent": 0, "direction": null
        }));
        let key = editor.update(|tx| import_record(tx, &registry, root, &rec))?;
        assert_eq!(editor.state().text_content(key), "x");
        Ok(())
    }

    #[test]
    fn test_newer_version_rejected() {
        let registry = Registry::with_builtins();
        let mut editor = Editor::new();
        let root = editor.root();
        let rec = record(json!({ "type": "image", "version": 7, "src": "a.png" }));
        let result = editor.try_update(|tx| import_record(tx, &registry, root, &rec));
        assert!(matches!(
            result,
            Err(DocError::UnsupportedVersion { found: 7, supported: 1, .. })
        ));
    }

    #[test]
    fn test_leaf_with_children_rejected() {
        let registry = Registry::with_builtins();
        let mut editor = Editor::new();
        let root = editor.root();
        let rec = record(json!({
            "type": "image", "version": 1, "src": "a.png",
            "children": [{ "type": "text", "version": 1, "text": "x" }]
        }));
        let result = editor.try_update(|tx| import_record(tx, &registry, root, &rec));
        assert!(matches!(result, Err(DocError::StructuralViolation(_))));
        assert!(editor.state().children_of(root).is_empty());
    }

    #[test]
    fn test_v1_container_upgraded() -> DocResult<()> {
        let registry = Registry::with_builtins();
        let mut editor = Editor::new();
        let root = editor.root();
        let rec = record(json!({
            "type": "styled-element", "version": 1, "style": "color: red", "href": "",
            "children": []
        }));
        let key = editor.update(|tx| import_record(tx, &registry, root, &rec))?;

        let node = editor.state().node(key)?;
        let container = node.try_get::<ContainerNode>()?;
        assert_eq!(container.tag, "div");
        assert_eq!(container.href(), None);
        assert_eq!(container.style, "color: red");
        Ok(())
    }

    #[test]
    fn test_json_text_round_trip() -> DocResult<()> {
        let json = r#"{"type":"link","version":1,"href":"/a","text":"A"}"#;
        let rec = from_json(json)?;
        assert_eq!(rec.count(), 1);
        assert!(rec.children.is_none());
        assert_eq!(from_json(&to_json_pretty(&rec)?)?, rec);
        assert!(matches!(from_json("{"), Err(DocError::Serialize(_))));
        Ok(())
    }
}
