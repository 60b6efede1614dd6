//! Image preprocessing ahead of OCR.
//!
//! Scans are converted to 8-bit grayscale and binarized with a global Otsu
//! threshold: pixels strictly brighter than the level become white (255),
//! everything else black (0).

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use crate::error::{OcrError, Result};

/// Grayscale + Otsu binarization of an in-memory image.
#[must_use = "binarized image is returned but not used"]
pub fn binarize(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let level = otsu_level(&gray);
    log::debug!("otsu level {level} for {}x{} image", gray.width(), gray.height());

    threshold(&gray, level, ThresholdType::Binary)
}

/// Load an image from disk and binarize it.
///
/// # Errors
///
/// Returns [`OcrError::FileNotFound`] if the path does not exist, or an image
/// error if it cannot be decoded.
pub fn preprocess_image(path: &Path) -> Result<GrayImage> {
    if !path.exists() {
        return Err(OcrError::FileNotFound(path.display().to_string()));
    }
    let image = image::open(path)?;
    Ok(binarize(&image))
}

/// Binarize `path` and save the result as PNG inside `dir`.
///
/// The output keeps the input's file stem, so OCR diagnostics still name the
/// original document.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the PNG cannot be written.
pub fn write_preprocessed(path: &Path, dir: &Path) -> Result<PathBuf> {
    let binary = preprocess_image(path)?;
    let stem = path
        .file_stem()
        .map_or_else(|| "page".into(), |s| s.to_string_lossy().into_owned());
    let out = dir.join(format!("{stem}.png"));
    binary.save_with_format(&out, image::ImageFormat::Png)?;
    Ok(out)
}
