//! JSON persistence for extraction results.
//!
//! Results are written as a single object keyed by the input file's base
//! name:
//!
//! ```json
//! {
//!     "I1.png": {
//!         "raw_text": "...",
//!         "structured_data": {
//!             "key_value_data": [["Invoice No", "INV-001"]],
//!             "sections": [],
//!             "tables": [],
//!             "raw_texts": ["Invoice No", "INV-001"]
//!         }
//!     }
//! }
//! ```
//!
//! Output uses 4-space indentation, keeps non-ASCII characters literal and
//! has no trailing newline, so the same input always yields the same bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{DocediError, Result};
use crate::extraction::FileExtraction;

/// Default output file name for combined extraction results
pub const COMBINED_RESULTS_FILE: &str = "combined_extraction_results.json";

/// Combined results: base file name → extraction.
pub type CombinedResults = BTreeMap<String, FileExtraction>;

/// Options for JSON serialization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonOptions {
    /// Indentation string (default: 4 spaces)
    pub indent: String,
}

impl Default for JsonOptions {
    #[inline]
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

/// JSON serializer for combined extraction results
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonSerializer {
    options: JsonOptions,
}

impl JsonSerializer {
    /// Create a new JSON serializer with default options (4-space indent)
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub fn new() -> Self {
        Self {
            options: JsonOptions::default(),
        }
    }

    /// Create a new JSON serializer with custom options
    #[inline]
    #[must_use = "creates serializer with custom options"]
    pub const fn with_options(options: JsonOptions) -> Self {
        Self { options }
    }

    /// Serialize any value with the configured indentation.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_vec<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.options.indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
        Ok(buf)
    }

    /// Serialize any value to a pretty-printed string.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_string<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let buf = self.to_vec(value)?;
        String::from_utf8(buf).map_err(|e| {
            DocediError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    /// Serialize one file's extraction keyed by the input's base name.
    ///
    /// # Errors
    /// Returns [`DocediError::InvalidPath`] if `input` has no file name, or a
    /// JSON error if serialization fails.
    pub fn serialize_extraction(&self, input: &Path, extraction: &FileExtraction) -> Result<String> {
        let results = single_result(input, extraction.clone())?;
        self.to_string(&results)
    }

    /// Write one file's extraction to `output`, replacing any existing file.
    ///
    /// # Errors
    /// Returns an error if the key cannot be derived or the file cannot be
    /// written.
    pub fn write_extraction(
        &self,
        output: &Path,
        input: &Path,
        extraction: &FileExtraction,
    ) -> Result<()> {
        let results = single_result(input, extraction.clone())?;
        let bytes = self.to_vec(&results)?;
        fs::write(output, bytes)?;
        log::info!("wrote extraction for {} to {}", input.display(), output.display());
        Ok(())
    }
}

/// The results key for an input path: its base file name.
///
/// # Errors
/// Returns [`DocediError::InvalidPath`] if the path ends in `..` or is a root.
pub fn results_key(input: &Path) -> Result<String> {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| DocediError::InvalidPath(input.display().to_string()))
}

fn single_result(input: &Path, extraction: FileExtraction) -> Result<CombinedResults> {
    let mut results = CombinedResults::new();
    results.insert(results_key(input)?, extraction);
    Ok(results)
}
