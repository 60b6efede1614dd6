//! OCR backends producing word or line [`Detection`]s.

use std::fs;
use std::path::{Path, PathBuf};

use docedi_core::{detections_from_json, reconstruct_text, Detection};

use crate::error::{OcrError, Result};

/// An engine that turns an image into positioned text detections.
pub trait OcrBackend {
    /// Short engine name for logs
    fn name(&self) -> &'static str;

    /// Detect text in `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot read the image or fails.
    fn detections(&self, image: &Path) -> Result<Vec<Detection>>;

    /// Detect text in `image` and lay it out in reading order.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`OcrBackend::detections`].
    fn reading_order_text(&self, image: &Path) -> Result<String> {
        let detections = self.detections(image)?;
        log::info!(
            "{}: {} detections in {}",
            self.name(),
            detections.len(),
            image.display()
        );
        Ok(reconstruct_text(&detections))
    }
}

/// Pre-computed detections stored as EasyOCR-style JSON triples.
///
/// The image argument is only checked for existence; detections always come
/// from the file given at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionsFile {
    path: PathBuf,
}

impl DetectionsFile {
    /// Read detections from `path`
    #[must_use = "backend is created but not used"]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load and decode the detections file.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::FileNotFound`] if the file is missing, or a core
    /// decoding error if any entry is malformed.
    pub fn load(&self) -> Result<Vec<Detection>> {
        if !self.path.exists() {
            return Err(OcrError::FileNotFound(self.path.display().to_string()));
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(detections_from_json(&json)?)
    }
}

impl OcrBackend for DetectionsFile {
    fn name(&self) -> &'static str {
        "detections-file"
    }

    fn detections(&self, image: &Path) -> Result<Vec<Detection>> {
        if !image.exists() {
            return Err(OcrError::FileNotFound(image.display().to_string()));
        }
        self.load()
    }
}
