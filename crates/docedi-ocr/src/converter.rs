//! Document-layout conversion: image → markdown + layout export JSON.
//!
//! [`DoclingCli`] drives the `docling` command-line converter into a scratch
//! directory; [`ExportedJson`] reads a document that was converted earlier.
//! [`extract_layout`] runs conversion and structured extraction together,
//! logging any failure with the file name before handing it to the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use docedi_core::{extract_document, FileExtraction, LayoutTree};
use serde_json::Value;

use crate::error::{OcrError, Result};
use crate::process::run_tool;

/// Default docling binary name
pub const DOCLING_BINARY: &str = "docling";

/// The two renditions a layout conversion yields.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedDocument {
    /// Markdown export, used as raw text for LLM prompts
    pub markdown: String,
    /// Layout export as decoded JSON
    pub export: Value,
}

/// Converts a document image into a [`ConvertedDocument`].
pub trait LayoutConverter {
    /// Convert `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is missing or the conversion fails.
    fn convert(&self, image: &Path) -> Result<ConvertedDocument>;
}

/// The `docling` command-line converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoclingCli {
    binary: PathBuf,
    extra_args: Vec<String>,
}

impl Default for DoclingCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DOCLING_BINARY),
            extra_args: Vec::new(),
        }
    }
}

impl DoclingCli {
    /// Use a specific docling executable
    #[must_use = "converter is created but not used"]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
        }
    }

    /// Append extra arguments to every invocation (e.g. `--ocr-engine`)
    #[must_use = "converter is created but not used"]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments for converting `image` into `output_dir`
    #[must_use = "argument list is returned but not used"]
    pub fn args(&self, image: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            image.display().to_string(),
            "--to".to_string(),
            "json".to_string(),
            "--to".to_string(),
            "md".to_string(),
            "--output".to_string(),
            output_dir.display().to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

impl LayoutConverter for DoclingCli {
    fn convert(&self, image: &Path) -> Result<ConvertedDocument> {
        if !image.exists() {
            return Err(OcrError::FileNotFound(image.display().to_string()));
        }

        let scratch = tempfile::tempdir()?;
        let tool = self.binary.display().to_string();
        let mut command = Command::new(&self.binary);
        command.args(self.args(image, scratch.path()));
        run_tool(&mut command, &tool)?;

        let stem = file_stem(image);
        let export = read_export(&scratch.path().join(format!("{stem}.json")))?;
        let markdown = read_required(&scratch.path().join(format!("{stem}.md")))?;
        Ok(ConvertedDocument { markdown, export })
    }
}

/// A layout export previously written by docling.
///
/// Markdown is read from a sibling `.md` file with the same stem when one
/// exists; otherwise it is rebuilt from the export's text nodes, one
/// paragraph each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedJson {
    path: PathBuf,
}

impl ExportedJson {
    /// Load the export at `path`
    #[must_use = "converter is created but not used"]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LayoutConverter for ExportedJson {
    fn convert(&self, image: &Path) -> Result<ConvertedDocument> {
        if !image.exists() {
            return Err(OcrError::FileNotFound(image.display().to_string()));
        }

        let export = read_export(&self.path)?;
        let sibling = self.path.with_extension("md");
        let markdown = if sibling.is_file() {
            fs::read_to_string(&sibling)?
        } else {
            markdown_from_texts(&export)?
        };
        Ok(ConvertedDocument { markdown, export })
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "document".into(), |s| s.to_string_lossy().into_owned())
}

fn read_required(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(OcrError::MissingOutput(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

fn read_export(path: &Path) -> Result<Value> {
    let json = read_required(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn markdown_from_texts(export: &Value) -> Result<String> {
    let tree = LayoutTree::from_value(export)?;
    let paragraphs: Vec<String> = tree
        .texts
        .iter()
        .filter(|t| !t.text().is_empty())
        .map(|t| {
            if t.is_section_header() {
                format!("## {}", t.text())
            } else {
                t.text().to_string()
            }
        })
        .collect();
    Ok(paragraphs.join("\n\n"))
}

/// Convert `image` and run structured extraction over the layout export.
///
/// # Errors
///
/// Returns the conversion error, or [`OcrError::Core`] for an export that
/// does not have the expected shape. Either is logged with the file name.
pub fn extract_layout(converter: &dyn LayoutConverter, image: &Path) -> Result<FileExtraction> {
    log::info!("processing image: {}", image.display());

    converter
        .convert(image)
        .and_then(|doc| Ok(extract_document(&doc.export)?))
        .inspect_err(|e| log::error!("error processing {}: {e}", image.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingConverter;

    impl LayoutConverter for FailingConverter {
        fn convert(&self, _image: &Path) -> Result<ConvertedDocument> {
            Err(OcrError::ToolFailed {
                tool: "docling".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "model download failed".to_string(),
            })
        }
    }

    struct FixedConverter(Value);

    impl LayoutConverter for FixedConverter {
        fn convert(&self, _image: &Path) -> Result<ConvertedDocument> {
            Ok(ConvertedDocument {
                markdown: String::new(),
                export: self.0.clone(),
            })
        }
    }

    fn export() -> Value {
        json!({
            "texts": [
                {"self_ref": "#/texts/0", "label": "section_header", "text": "Bill To"},
                {"self_ref": "#/texts/1", "label": "text", "text": "ACME Corp"},
                {"self_ref": "#/texts/2", "label": "text", "text": ""}
            ],
            "groups": [{"children": [{"$ref": "#/texts/0"}, {"$ref": "#/texts/1"}]}]
        })
    }

    #[test]
    fn test_docling_args() {
        let cli = DoclingCli::default().with_args(["--ocr-engine", "tesseract"]);
        let args = cli.args(Path::new("PO1.png"), Path::new("/tmp/out"));
        assert_eq!(
            args,
            vec![
                "PO1.png",
                "--to",
                "json",
                "--to",
                "md",
                "--output",
                "/tmp/out",
                "--ocr-engine",
                "tesseract"
            ]
        );
    }

    #[test]
    fn test_docling_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("PO1.png");
        fs::write(&image, b"not really a png").unwrap();

        let cli = DoclingCli::with_binary("docedi-missing-docling");
        assert!(matches!(cli.convert(&image), Err(OcrError::ToolNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_docling_reads_outputs_by_stem() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("PO1.png");
        fs::write(&image, b"png").unwrap();

        // Fake converter: writes <stem>.json and <stem>.md into the --output dir.
        let script = dir.path().join("fake-docling");
        fs::write(
            &script,
            "#!/bin/sh\nout=\"$7\"\necho '{\"texts\":[{\"self_ref\":\"#/texts/0\",\"text\":\"PO\"}]}' > \"$out/PO1.json\"\necho '# PO' > \"$out/PO1.md\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let doc = DoclingCli::with_binary(&script).convert(&image).unwrap();
        assert_eq!(doc.markdown.trim(), "# PO");
        assert_eq!(doc.export["texts"][0]["text"], "PO");
    }

    #[cfg(unix)]
    #[test]
    fn test_docling_missing_output_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("PO1.png");
        fs::write(&image, b"png").unwrap();
        let script = dir.path().join("silent-docling");
        fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            DoclingCli::with_binary(&script).convert(&image),
            Err(OcrError::MissingOutput(p)) if p.ends_with("PO1.json")
        ));
    }

    #[test]
    fn test_exported_json_rebuilds_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("I1.png");
        fs::write(&image, b"png").unwrap();
        let path = dir.path().join("I1.json");
        fs::write(&path, export().to_string()).unwrap();

        let doc = ExportedJson::new(&path).convert(&image).unwrap();
        assert_eq!(doc.markdown, "## Bill To\n\nACME Corp");
    }

    #[test]
    fn test_exported_json_prefers_sibling_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("I1.png");
        fs::write(&image, b"png").unwrap();
        let path = dir.path().join("I1.json");
        fs::write(&path, export().to_string()).unwrap();
        fs::write(dir.path().join("I1.md"), "| Item | Qty |").unwrap();

        let doc = ExportedJson::new(&path).convert(&image).unwrap();
        assert_eq!(doc.markdown, "| Item | Qty |");
    }

    #[test]
    fn test_extract_layout_success() {
        let image = tempfile::NamedTempFile::new().unwrap();
        let extraction = extract_layout(&FixedConverter(export()), image.path()).unwrap();
        assert_eq!(extraction.raw_text, "Bill To ACME Corp ");
        assert_eq!(extraction.structured_data.sections, vec!["Bill To"]);
        assert_eq!(
            extraction.structured_data.key_value_data,
            vec![("Bill To".to_string(), "ACME Corp".to_string())]
        );
    }

    #[test]
    fn test_extract_layout_returns_conversion_error() {
        match extract_layout(&FailingConverter, Path::new("I1.png")) {
            Err(OcrError::ToolFailed { stderr, .. }) => assert_eq!(stderr, "model download failed"),
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_layout_bad_tree_is_core_error() {
        let bad = json!({"texts": "not a list"});
        assert!(matches!(
            extract_layout(&FixedConverter(bad), Path::new("I1.png")),
            Err(OcrError::Core(_))
        ));
    }
}
