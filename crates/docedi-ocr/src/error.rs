use docedi_core::DocediError;
use thiserror::Error;

/// Errors raised by OCR engines and layout converters.
#[derive(Error, Debug)]
pub enum OcrError {
    /// File I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The image could not be decoded or encoded
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Malformed TSV from the OCR engine
    #[error("Failed to parse OCR output: {0}")]
    TsvError(#[from] csv::Error),

    /// Malformed JSON from a converter or detections file
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Decoding or extraction error from docedi-core
    #[error(transparent)]
    Core(#[from] DocediError),

    /// The input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// An external tool is not installed or not in PATH
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    /// An external tool ran but exited unsuccessfully
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        /// Program name
        tool: String,
        /// Exit status as reported by the OS
        status: String,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// A converter finished without writing the expected output file
    #[error("Conversion produced no output at {0}")]
    MissingOutput(String),
}

/// Result type alias for docedi-ocr operations.
pub type Result<T> = std::result::Result<T, OcrError>;
