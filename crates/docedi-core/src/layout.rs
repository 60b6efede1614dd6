//! Typed model of a document-layout tree.
//!
//! The layout model exports a nested JSON document with three collections that
//! matter here: `texts`, `groups` and `tables`. Groups refer to texts through
//! JSON-pointer references such as `{"$ref": "#/texts/4"}`, resolved against
//! each text's `self_ref`.
//!
//! Every field is optional on the wire. Missing collections, `children`,
//! `data`, `table_cells`, labels or texts decode as empty rather than failing,
//! so partially populated exports still extract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// JSON pointer reference (e.g., `{"$ref": "#/texts/0"}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    /// JSON pointer path to the referenced item
    #[serde(rename = "$ref", default)]
    pub ref_path: String,
}

impl ItemRef {
    /// Creates a new `ItemRef` with the given reference path.
    #[inline]
    #[must_use = "creates a new ItemRef with the given path"]
    pub fn new(ref_path: impl Into<String>) -> Self {
        Self {
            ref_path: ref_path.into(),
        }
    }
}

/// Text item labels emitted by the layout model.
///
/// Only [`TextLabel::SectionHeader`] drives extraction; the rest are decoded so
/// the tree stays inspectable. Labels this enum does not know map to `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLabel {
    /// Document title
    Title,
    /// Section or subsection header
    SectionHeader,
    /// Body paragraph
    Paragraph,
    /// Generic text
    #[default]
    Text,
    /// List item
    ListItem,
    /// Figure or table caption
    Caption,
    /// Footnote
    Footnote,
    /// Running page header
    PageHeader,
    /// Running page footer
    PageFooter,
    /// Key/value form region
    KeyValueRegion,
    /// Anything else
    #[serde(other)]
    Other,
}

/// A text node: one recognized run with its own reference id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    /// Self-reference path (e.g., "#/texts/0")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_ref: Option<String>,
    /// Item label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<TextLabel>,
    /// Literal text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TextNode {
    /// Create a text node with a reference id and text
    #[must_use = "text node is created but not used"]
    pub fn new(self_ref: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            self_ref: Some(self_ref.into()),
            label: None,
            text: Some(text.into()),
        }
    }

    /// Set the label
    #[must_use = "returns the labelled node"]
    pub fn with_label(mut self, label: TextLabel) -> Self {
        self.label = Some(label);
        self
    }

    /// The text, or `""` when absent
    #[inline]
    #[must_use = "text is returned but not used"]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Whether this node is labelled as a section header
    #[inline]
    #[must_use = "label check result is returned but not used"]
    pub fn is_section_header(&self) -> bool {
        self.label == Some(TextLabel::SectionHeader)
    }
}

/// A group node: an ordered run of references to text nodes.
///
/// Form-like layouts emit label/value fields as groups, which is what
/// key/value pairing relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    /// Self-reference path (e.g., "#/groups/0")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_ref: Option<String>,
    /// Group name assigned by the layout model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Referenced children, in order
    #[serde(default)]
    pub children: Vec<ItemRef>,
}

impl GroupNode {
    /// Create a group referencing the given paths
    #[must_use = "group node is created but not used"]
    pub fn new<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            self_ref: None,
            name: None,
            children: children.into_iter().map(ItemRef::new).collect(),
        }
    }
}

/// A single table cell positioned by its starting row/column offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell text content
    #[serde(default)]
    pub text: String,
    /// Starting row index in the table grid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row_offset_idx: Option<usize>,
    /// Starting column index in the table grid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_col_offset_idx: Option<usize>,
}

impl TableCell {
    /// Create a cell at `(row, col)`
    #[must_use = "table cell is created but not used"]
    pub fn new(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start_row_offset_idx: Some(row),
            start_col_offset_idx: Some(col),
        }
    }

    /// Row offset, defaulting to 0
    #[inline]
    #[must_use = "row index is returned but not used"]
    pub fn row(&self) -> usize {
        self.start_row_offset_idx.unwrap_or(0)
    }

    /// Column offset, defaulting to 0
    #[inline]
    #[must_use = "column index is returned but not used"]
    pub fn col(&self) -> usize {
        self.start_col_offset_idx.unwrap_or(0)
    }
}

/// Table payload: a flat list of positioned cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    /// Flat list of table cells
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

/// A table node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    /// Self-reference path (e.g., "#/tables/0")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_ref: Option<String>,
    /// Cell payload
    #[serde(default)]
    pub data: TableData,
}

impl TableNode {
    /// Create a table from its cells
    #[must_use = "table node is created but not used"]
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            self_ref: None,
            data: TableData { table_cells: cells },
        }
    }
}

/// Borrowed view over any node in a [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutNode<'a> {
    /// A text node
    Text(&'a TextNode),
    /// A group node
    Group(&'a GroupNode),
    /// A table node
    Table(&'a TableNode),
}

/// The decoded layout tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    /// Text nodes, in export order
    #[serde(default)]
    pub texts: Vec<TextNode>,
    /// Group nodes, in export order
    #[serde(default)]
    pub groups: Vec<GroupNode>,
    /// Table nodes, in export order
    #[serde(default)]
    pub tables: Vec<TableNode>,
}

impl LayoutTree {
    /// Decode a tree from a JSON value. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DocediError::JsonError`] if a present field has the
    /// wrong JSON type (e.g. `texts` is not an array).
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Decode a tree from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DocediError::JsonError`] on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether the tree has no texts, groups or tables
    #[inline]
    #[must_use = "emptiness check result is returned but not used"]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.groups.is_empty() && self.tables.is_empty()
    }

    /// Iterate over every node: texts, then groups, then tables.
    pub fn nodes(&self) -> impl Iterator<Item = LayoutNode<'_>> {
        self.texts
            .iter()
            .map(LayoutNode::Text)
            .chain(self.groups.iter().map(LayoutNode::Group))
            .chain(self.tables.iter().map(LayoutNode::Table))
    }

    /// Build the `self_ref` → text node lookup used to resolve references.
    ///
    /// Nodes without a `self_ref` are not indexed. On duplicate ids the last
    /// node wins.
    #[must_use = "text index is built but not used"]
    pub fn text_index(&self) -> HashMap<&str, &TextNode> {
        self.texts
            .iter()
            .filter_map(|t| t.self_ref.as_deref().map(|r| (r, t)))
            .collect()
    }
}

/// Visit every string stored under `key`, depth first, at any nesting level.
///
/// Objects are walked in key order as decoded (insertion order), arrays in
/// index order. A matching key whose value is not a string is descended into
/// like any other value.
pub fn walk_keyed_strings<'a, F>(value: &'a Value, key: &str, visit: &mut F)
where
    F: FnMut(&'a str),
{
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                match v {
                    Value::String(s) if k == key => visit(s),
                    _ => walk_keyed_strings(v, key, visit),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_keyed_strings(item, key, visit);
            }
        }
        _ => {}
    }
}

/// Collect every string found under a `"text"` key, anywhere in the tree.
///
/// ```rust
/// use docedi_core::collect_texts;
/// use serde_json::json;
///
/// let tree = json!({"a": {"b": {"text": "x"}}});
/// assert_eq!(collect_texts(&tree), vec!["x".to_string()]);
/// ```
#[must_use = "collected texts are returned but not used"]
pub fn collect_texts(value: &Value) -> Vec<String> {
    let mut texts = Vec::new();
    walk_keyed_strings(value, "text", &mut |s| texts.push(s.to_string()));
    texts
}
