//! Structured-field extraction over a [`LayoutTree`].
//!
//! Produces four collections from one tree:
//!
//! - `key_value_data`: label/value pairs read positionally out of each group
//! - `sections`: texts labelled `section_header`
//! - `tables`: each table's cells regrouped into ordered rows
//! - `raw_texts`: every text node's string, in export order
//!
//! Field order in [`ExtractionResult`] is the order the persisted JSON uses.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::layout::{collect_texts, GroupNode, LayoutTree, TableNode, TextNode};

/// One reconstructed table: rows of cell strings.
pub type Table = Vec<Vec<String>>;

/// Structured data extracted from a layout tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Key/value pairs, in group encounter order
    pub key_value_data: Vec<(String, String)>,
    /// Section header texts, in text-list order
    pub sections: Vec<String>,
    /// Tables, in export order
    pub tables: Vec<Table>,
    /// All text node strings, in text-list order
    pub raw_texts: Vec<String>,
}

impl ExtractionResult {
    /// Whether all four collections are empty
    #[inline]
    #[must_use = "emptiness check result is returned but not used"]
    pub fn is_empty(&self) -> bool {
        self.key_value_data.is_empty()
            && self.sections.is_empty()
            && self.tables.is_empty()
            && self.raw_texts.is_empty()
    }
}

/// Everything extracted from one document image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExtraction {
    /// Every `"text"` string in the export, joined with single spaces
    pub raw_text: String,
    /// Typed extraction over the decoded tree
    pub structured_data: ExtractionResult,
}

/// Resolve a group's children to their non-empty texts.
///
/// Unresolvable references and empty texts are dropped, so later items shift
/// left rather than leaving a gap.
#[must_use = "resolved text run is returned but not used"]
pub fn group_text_run<'a>(group: &GroupNode, index: &HashMap<&str, &'a TextNode>) -> Vec<&'a str> {
    group
        .children
        .iter()
        .filter_map(|child| index.get(child.ref_path.as_str()).copied())
        .map(TextNode::text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Pair a text run positionally: `(0, 1), (2, 3), ...`.
///
/// An odd trailing key pairs with `""`.
///
/// ```rust
/// use docedi_core::pair_key_values;
///
/// let pairs = pair_key_values(&["A", "B", "C"]);
/// assert_eq!(
///     pairs,
///     vec![
///         ("A".to_string(), "B".to_string()),
///         ("C".to_string(), String::new()),
///     ]
/// );
/// ```
#[must_use = "key/value pairs are returned but not used"]
pub fn pair_key_values(run: &[&str]) -> Vec<(String, String)> {
    run.chunks(2)
        .map(|pair| {
            let key = pair[0].to_string();
            let value = pair.get(1).map_or_else(String::new, |v| (*v).to_string());
            (key, value)
        })
        .collect()
}

/// Regroup a table's flat cells into rows.
///
/// Rows come out in ascending row offset; cells within a row in ascending
/// column offset, stable on ties. Missing offsets count as 0. A table with no
/// cells yields an empty table.
#[must_use = "reconstructed table is returned but not used"]
pub fn reconstruct_table(table: &TableNode) -> Table {
    let mut rows: BTreeMap<usize, Vec<_>> = BTreeMap::new();
    for cell in &table.data.table_cells {
        rows.entry(cell.row()).or_default().push(cell);
    }

    rows.into_values()
        .map(|mut cells| {
            cells.sort_by_key(|c| c.col());
            cells.into_iter().map(|c| c.text.clone()).collect()
        })
        .collect()
}

/// Extract key/value pairs, sections, tables and raw texts from a tree.
#[must_use = "extraction result is returned but not used"]
pub fn extract_structured_data(tree: &LayoutTree) -> ExtractionResult {
    let index = tree.text_index();

    let key_value_data = tree
        .groups
        .iter()
        .map(|group| group_text_run(group, &index))
        .filter(|run| !run.is_empty())
        .flat_map(|run| pair_key_values(&run))
        .collect();

    let sections = tree
        .texts
        .iter()
        .filter(|t| t.is_section_header())
        .map(|t| t.text().to_string())
        .collect();

    let raw_texts = tree.texts.iter().map(|t| t.text().to_string()).collect();

    let tables = tree.tables.iter().map(reconstruct_table).collect();

    ExtractionResult {
        key_value_data,
        sections,
        tables,
        raw_texts,
    }
}

/// Full extraction from an exported layout document.
///
/// `raw_text` comes from the permissive walk over the raw JSON; the
/// structured collections come from the typed tree.
///
/// # Errors
///
/// Returns [`crate::DocediError::JsonError`] if the export has a present field
/// of the wrong JSON type.
pub fn extract_document(export: &Value) -> Result<FileExtraction> {
    let tree = LayoutTree::from_value(export)?;
    let structured_data = extract_structured_data(&tree);
    let raw_text = collect_texts(export).join(" ");

    log::debug!(
        "extracted {} key/value pairs, {} sections, {} tables from {} texts",
        structured_data.key_value_data.len(),
        structured_data.sections.len(),
        structured_data.tables.len(),
        structured_data.raw_texts.len()
    );

    Ok(FileExtraction {
        raw_text,
        structured_data,
    })
}
