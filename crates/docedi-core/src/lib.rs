//! # docedi-core
//!
//! Pure transformations behind the docedi pipeline: turning OCR detections
//! into reading-ordered text, and turning a document-layout tree into
//! key/value pairs, section headers and tables.
//!
//! Nothing in this crate touches models, the network or the process
//! environment. Inputs are decoded once at the boundary (see [`Detection`] and
//! [`LayoutTree`]) and every operation is a function from input data to output
//! data.
//!
//! ## Reading order
//!
//! ```rust
//! use docedi_core::{quad_from_rect, reconstruct_text, Detection};
//!
//! let detections = vec![
//!     Detection::new(quad_from_rect(300.0, 40.0, 80.0, 14.0), "$1,250.00", 0.98),
//!     Detection::new(quad_from_rect(20.0, 42.0, 60.0, 14.0), "Total", 0.99),
//! ];
//! assert_eq!(reconstruct_text(&detections), "Total $1,250.00\n");
//! ```
//!
//! ## Structured extraction
//!
//! ```rust
//! use docedi_core::{extract_document, JsonSerializer};
//! use serde_json::json;
//! use std::path::Path;
//!
//! let export = json!({
//!     "texts": [
//!         {"self_ref": "#/texts/0", "text": "Invoice No"},
//!         {"self_ref": "#/texts/1", "text": "INV-001"}
//!     ],
//!     "groups": [{"children": [{"$ref": "#/texts/0"}, {"$ref": "#/texts/1"}]}]
//! });
//!
//! let extraction = extract_document(&export)?;
//! assert_eq!(
//!     extraction.structured_data.key_value_data,
//!     vec![("Invoice No".to_string(), "INV-001".to_string())]
//! );
//!
//! let json = JsonSerializer::new().serialize_extraction(Path::new("I1.png"), &extraction)?;
//! assert!(json.contains("\"I1.png\""));
//! # Ok::<(), docedi_core::DocediError>(())
//! ```

pub mod detection;
pub mod error;
pub mod extraction;
pub mod layout;
pub mod reading_order;
pub mod serializer;

pub use detection::{detections_from_json, quad_from_rect, Detection, Point, Quad};
pub use error::{DocediError, Result};
pub use extraction::{
    extract_document, extract_structured_data, group_text_run, pair_key_values,
    reconstruct_table, ExtractionResult, FileExtraction, Table,
};
pub use layout::{
    collect_texts, walk_keyed_strings, GroupNode, ItemRef, LayoutNode, LayoutTree, TableCell,
    TableData, TableNode, TextLabel, TextNode,
};
pub use reading_order::{reconstruct_text, row_key, row_buckets, ROW_QUANTUM};
pub use serializer::json::{results_key, CombinedResults};
pub use serializer::{JsonOptions, JsonSerializer, COMBINED_RESULTS_FILE};
