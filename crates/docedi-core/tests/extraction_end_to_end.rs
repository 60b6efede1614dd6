//! End-to-end extraction: layout export → combined JSON file on disk.

use std::fs;
use std::path::Path;

use docedi_core::{extract_document, CombinedResults, JsonSerializer, COMBINED_RESULTS_FILE};
use serde_json::Value;

const INVOICE_EXPORT: &str = r##"{
    "schema_name": "DoclingDocument",
    "name": "I1",
    "texts": [
        {"self_ref": "#/texts/0", "label": "text", "orig": "Invoice No", "text": "Invoice No"},
        {"self_ref": "#/texts/1", "label": "text", "orig": "INV-001", "text": "INV-001"}
    ],
    "groups": [
        {"self_ref": "#/groups/0", "name": "group", "children": [{"$ref": "#/texts/0"}, {"$ref": "#/texts/1"}]}
    ],
    "tables": [
        {"self_ref": "#/tables/0", "data": {"num_rows": 2, "num_cols": 2, "table_cells": [
            {"text": "2", "start_row_offset_idx": 1, "start_col_offset_idx": 1},
            {"text": "Item", "start_row_offset_idx": 0, "start_col_offset_idx": 0},
            {"text": "Widget", "start_row_offset_idx": 1, "start_col_offset_idx": 0},
            {"text": "Qty", "start_row_offset_idx": 0, "start_col_offset_idx": 1}
        ]}}
    ]
}"##;

const EXPECTED: &str = r#"{
    "I1.png": {
        "raw_text": "Invoice No INV-001 2 Item Widget Qty",
        "structured_data": {
            "key_value_data": [
                [
                    "Invoice No",
                    "INV-001"
                ]
            ],
            "sections": [],
            "tables": [
                [
                    [
                        "Item",
                        "Qty"
                    ],
                    [
                        "Widget",
                        "2"
                    ]
                ]
            ],
            "raw_texts": [
                "Invoice No",
                "INV-001"
            ]
        }
    }
}"#;

fn run_once(dir: &Path) -> Vec<u8> {
    let export: Value = serde_json::from_str(INVOICE_EXPORT).unwrap();
    let extraction = extract_document(&export).unwrap();
    let out = dir.join(COMBINED_RESULTS_FILE);
    JsonSerializer::new()
        .write_extraction(&out, Path::new("BusinessViews/Invoice/I1.png"), &extraction)
        .unwrap();
    fs::read(&out).unwrap()
}

#[test]
fn test_invoice_export_writes_expected_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = run_once(dir.path());
    assert_eq!(String::from_utf8(bytes).unwrap(), EXPECTED);
}

#[test]
fn test_output_is_byte_reproducible() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    assert_eq!(run_once(first.path()), run_once(second.path()));
}

#[test]
fn test_output_round_trips_into_typed_results() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = run_once(dir.path());
    let results: CombinedResults = serde_json::from_slice(&bytes).unwrap();

    let invoice = &results["I1.png"];
    assert_eq!(
        invoice.structured_data.key_value_data,
        vec![("Invoice No".to_string(), "INV-001".to_string())]
    );
    assert_eq!(invoice.structured_data.tables.len(), 1);
    assert!(invoice.structured_data.sections.is_empty());
}

#[test]
fn test_empty_export_writes_empty_collections() {
    let export: Value = serde_json::from_str("{}").unwrap();
    let extraction = extract_document(&export).unwrap();
    let json = JsonSerializer::new()
        .serialize_extraction(Path::new("blank.png"), &extraction)
        .unwrap();

    assert_eq!(
        json,
        "{\n    \"blank.png\": {\n        \"raw_text\": \"\",\n        \"structured_data\": {\n            \"key_value_data\": [],\n            \"sections\": [],\n            \"tables\": [],\n            \"raw_texts\": []\n        }\n    }\n}"
    );
}
