//! Tesseract driver.
//!
//! Runs the `tesseract` binary in two modes:
//!
//! - plain text (`tesseract <img> stdout ...`), returned as-is
//! - word-level TSV (`tesseract <img> stdout ... tsv`), parsed into
//!   [`Detection`]s for reading-order reconstruction
//!
//! The input is binarized first unless [`TesseractOptions::preprocess`] is
//! off.

use std::path::{Path, PathBuf};
use std::process::Command;

use docedi_core::{quad_from_rect, Detection};
use serde::Deserialize;

use crate::backend::OcrBackend;
use crate::error::{OcrError, Result};
use crate::preprocess::write_preprocessed;
use crate::process::run_tool;

/// Default tesseract binary name
pub const TESSERACT_BINARY: &str = "tesseract";

/// TSV row level for individual words
const WORD_LEVEL: u8 = 5;

/// Options passed to every tesseract invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractOptions {
    /// Language packs, joined with `+` (e.g. `eng+deu`)
    pub languages: Vec<String>,
    /// Page segmentation mode (`--psm`)
    pub psm: u8,
    /// OCR engine mode (`--oem`)
    pub oem: u8,
    /// Extra arguments appended after the mode flags (e.g. `-c key=value`)
    pub extra_config: Vec<String>,
    /// Binarize the image before recognition
    pub preprocess: bool,
    /// Program to run
    pub binary: PathBuf,
}

impl Default for TesseractOptions {
    fn default() -> Self {
        Self {
            languages: vec!["eng".to_string()],
            psm: 6,
            oem: 3,
            extra_config: Vec::new(),
            preprocess: true,
            binary: PathBuf::from(TESSERACT_BINARY),
        }
    }
}

impl TesseractOptions {
    /// The `-l` argument value
    #[must_use = "language argument is returned but not used"]
    pub fn language_arg(&self) -> String {
        if self.languages.is_empty() {
            "eng".to_string()
        } else {
            self.languages.join("+")
        }
    }

    /// Arguments following `<image> stdout`.
    #[must_use = "argument list is returned but not used"]
    pub fn args(&self, tsv: bool) -> Vec<String> {
        let mut args = vec![
            "-l".to_string(),
            self.language_arg(),
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
        ];
        args.extend(self.extra_config.iter().cloned());
        if tsv {
            args.push("tsv".to_string());
        }
        args
    }
}

/// The tesseract OCR engine.
#[derive(Debug, Clone, Default)]
pub struct Tesseract {
    options: TesseractOptions,
}

impl Tesseract {
    /// Create a driver with the given options
    #[must_use = "driver is created but not used"]
    pub const fn new(options: TesseractOptions) -> Self {
        Self { options }
    }

    /// Options used for each run
    #[must_use]
    pub const fn options(&self) -> &TesseractOptions {
        &self.options
    }

    /// Recognize `image` and return tesseract's plain-text output.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is missing, preprocessing fails, or
    /// tesseract cannot be run.
    pub fn image_to_string(&self, image: &Path) -> Result<String> {
        self.run(image, false)
    }

    /// Recognize `image` at word level.
    ///
    /// # Errors
    ///
    /// Returns an error if tesseract fails or its TSV cannot be parsed.
    pub fn image_to_detections(&self, image: &Path) -> Result<Vec<Detection>> {
        let tsv = self.run(image, true)?;
        parse_tsv(&tsv)
    }

    fn run(&self, image: &Path, tsv: bool) -> Result<String> {
        if !image.exists() {
            return Err(OcrError::FileNotFound(image.display().to_string()));
        }

        // Keeps the binarized copy alive until tesseract exits.
        let scratch = tempfile::tempdir()?;
        let input = if self.options.preprocess {
            write_preprocessed(image, scratch.path())?
        } else {
            image.to_path_buf()
        };

        let tool = self.options.binary.display().to_string();
        let mut command = Command::new(&self.options.binary);
        command.arg(&input).arg("stdout").args(self.options.args(tsv));

        let output = run_tool(&mut command, &tool)?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        log::debug!("tesseract returned {} bytes for {}", text.len(), image.display());
        Ok(text)
    }
}

impl OcrBackend for Tesseract {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn detections(&self, image: &Path) -> Result<Vec<Detection>> {
        self.image_to_detections(image)
    }
}

#[derive(Debug, Deserialize)]
struct TsvRow {
    level: u8,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    conf: f64,
    #[serde(default)]
    text: Option<String>,
}

/// Parse tesseract TSV output into word detections.
///
/// Only word-level rows with non-blank text are kept. Confidence is rescaled
/// from tesseract's 0-100 to 0.0-1.0.
///
/// # Errors
///
/// Returns [`OcrError::TsvError`] if a row does not match the TSV header.
pub fn parse_tsv(tsv: &str) -> Result<Vec<Detection>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(tsv.as_bytes());

    let mut detections = Vec::new();
    for row in reader.deserialize::<TsvRow>() {
        let row = row?;
        if row.level != WORD_LEVEL {
            continue;
        }
        let Some(text) = row.text.filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        let bbox = quad_from_rect(row.left, row.top, row.width, row.height);
        detections.push(Detection::new(bbox, text, row.conf / 100.0));
    }
    Ok(detections)
}
