//! OCR and layout conversion for docedi
//!
//! This crate wraps the external engines that turn a scanned document image
//! into text:
//!
//! - [`preprocess`]: grayscale + Otsu binarization
//! - [`Tesseract`]: plain-text and word-level recognition via the
//!   `tesseract` binary
//! - [`DetectionsFile`]: pre-computed EasyOCR-style detections
//! - [`DoclingCli`] / [`ExportedJson`]: document-layout conversion yielding
//!   markdown plus the layout export consumed by
//!   [`docedi_core::extract_document`]
//!
//! Engines are opaque; only their input and output contracts matter here.

pub mod backend;
pub mod converter;
pub mod error;
pub mod preprocess;
pub mod process;
pub mod tesseract;

pub use backend::{DetectionsFile, OcrBackend};
pub use converter::{
    extract_layout, ConvertedDocument, DoclingCli, ExportedJson, LayoutConverter, DOCLING_BINARY,
};
pub use error::{OcrError, Result};
pub use preprocess::{binarize, preprocess_image, write_preprocessed};
pub use process::check_tool_available;
pub use tesseract::{parse_tsv, Tesseract, TesseractOptions, TESSERACT_BINARY};
