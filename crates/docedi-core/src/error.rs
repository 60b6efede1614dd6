//! Error types for extraction and persistence.
//!
//! The transformations in this crate are total over well-formed input, so the
//! only failures come from the boundary: decoding JSON into detections or a
//! layout tree, and writing results to disk.

use thiserror::Error;

/// Errors raised while decoding inputs or persisting extraction results.
///
/// # Examples
///
/// ```rust
/// use docedi_core::{DocediError, LayoutTree};
///
/// match LayoutTree::from_json_str("{ not json") {
///     Err(DocediError::JsonError(e)) => eprintln!("bad layout JSON: {e}"),
///     Err(e) => eprintln!("other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum DocediError {
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON decoding or encoding error.
    ///
    /// Raised for malformed layout trees, and for detections whose bounding
    /// box does not have exactly four corners.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The path has no usable file name to key the results by.
    #[error("Invalid input path: {0}")]
    InvalidPath(String),
}

/// Result type alias for docedi-core operations.
pub type Result<T> = std::result::Result<T, DocediError>;
