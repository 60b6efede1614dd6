//! Configuration file support for `.docedi.toml`.
//!
//! Files can be placed in:
//! - User home directory: `~/.docedi.toml` (user defaults)
//! - Project directory: `./.docedi.toml` (project defaults)
//! - Custom location via `--config` (replaces both)
//!
//! Precedence (highest to lowest): command-line flags, project config, user
//! config, built-in defaults.
//!
//! ```toml
//! [llm]
//! model_id = "meta-llama/llama-3-3-70b-instruct"
//! max_tokens = 4000
//! temperature = 0.3
//! top_p = 1.0
//! timeout_secs = 120
//! iam_url = "https://iam.cloud.ibm.com/identity/token"
//!
//! [ocr]
//! languages = ["eng"]
//! psm = 6
//! oem = 3
//! preprocess = true
//!
//! [output]
//! path = "combined_extraction_results.json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use docedi_core::COMBINED_RESULTS_FILE;
use docedi_llm::LlmConfig;
use docedi_ocr::TesseractOptions;
use serde::{Deserialize, Serialize};

/// Configuration file name looked up in the project and home directories
pub const CONFIG_FILE_NAME: &str = ".docedi.toml";

/// Configuration file structure for `.docedi.toml`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for the chat model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmSection>,

    /// Defaults for the `ocr` and `edi` commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrSection>,

    /// Defaults for the `extract` command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSection>,
}

/// `[llm]`: generation parameters (credentials stay in the environment)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// IAM token endpoint for private or staging clouds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_url: Option<String>,
}

/// `[ocr]`: tesseract defaults
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psm: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oem: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocess: Option<bool>,
}

/// `[output]`: where extraction results go
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl LlmSection {
    fn overlay(self, over: Self) -> Self {
        Self {
            model_id: over.model_id.or(self.model_id),
            max_tokens: over.max_tokens.or(self.max_tokens),
            temperature: over.temperature.or(self.temperature),
            top_p: over.top_p.or(self.top_p),
            timeout_secs: over.timeout_secs.or(self.timeout_secs),
            iam_url: over.iam_url.or(self.iam_url),
        }
    }
}

impl OcrSection {
    fn overlay(self, over: Self) -> Self {
        Self {
            languages: over.languages.or(self.languages),
            psm: over.psm.or(self.psm),
            oem: over.oem.or(self.oem),
            preprocess: over.preprocess.or(self.preprocess),
        }
    }
}

impl OutputSection {
    fn overlay(self, over: Self) -> Self {
        Self {
            path: over.path.or(self.path),
        }
    }
}

/// Field-wise overlay of two optional sections; `over` wins where set.
fn overlay_section<T>(base: Option<T>, over: Option<T>, merge: fn(T, T) -> T) -> Option<T> {
    match (base, over) {
        (Some(base), Some(over)) => Some(merge(base, over)),
        (base, over) => over.or(base),
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            eprintln!(
                "{} Failed to parse config file: {}",
                "Error:".red().bold(),
                path.display()
            );
            eprintln!("{} {}", "Parse error:".yellow().bold(), e);
            anyhow::anyhow!("Failed to parse config file: {e}")
        })
    }

    /// Load `--config` if given, otherwise discover and merge user and
    /// project files.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        let user = dirs::home_dir()
            .and_then(|home| Self::load_optional(&home.join(CONFIG_FILE_NAME), "user"));
        let project = Self::load_optional(Path::new(CONFIG_FILE_NAME), "project");
        Ok(Self::merge(user, project))
    }

    /// Load a config that may not exist; parse failures only warn.
    fn load_optional(path: &Path, scope: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!(
                    "{} Failed to load {scope} config from {}: {e}",
                    "Warning:".yellow().bold(),
                    path.display()
                );
                None
            }
        }
    }

    /// Merge with precedence: project config > user config > defaults
    pub fn merge(user: Option<Self>, project: Option<Self>) -> Self {
        let user = user.unwrap_or_default();
        let project = project.unwrap_or_default();
        Self {
            llm: overlay_section(user.llm, project.llm, LlmSection::overlay),
            ocr: overlay_section(user.ocr, project.ocr, OcrSection::overlay),
            output: overlay_section(user.output, project.output, OutputSection::overlay),
        }
    }

    /// Apply `[llm]` settings on top of an environment-derived config
    pub fn apply_llm(&self, mut llm: LlmConfig) -> LlmConfig {
        let Some(section) = &self.llm else {
            return llm;
        };
        if let Some(model_id) = &section.model_id {
            llm.model_id.clone_from(model_id);
        }
        if let Some(max_tokens) = section.max_tokens {
            llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = section.temperature {
            llm.temperature = temperature;
        }
        if let Some(top_p) = section.top_p {
            llm.top_p = top_p;
        }
        if let Some(secs) = section.timeout_secs {
            llm.timeout = Some(Duration::from_secs(secs));
        }
        llm
    }

    /// IAM endpoint override from `[llm]`
    pub fn iam_url(&self) -> Option<&str> {
        self.llm.as_ref().and_then(|l| l.iam_url.as_deref())
    }

    /// Tesseract options from `[ocr]`, falling back to built-in defaults
    pub fn tesseract_options(&self) -> TesseractOptions {
        let mut options = TesseractOptions::default();
        let Some(section) = &self.ocr else {
            return options;
        };
        if let Some(languages) = &section.languages {
            options.languages.clone_from(languages);
        }
        if let Some(psm) = section.psm {
            options.psm = psm;
        }
        if let Some(oem) = section.oem {
            options.oem = oem;
        }
        if let Some(preprocess) = section.preprocess {
            options.preprocess = preprocess;
        }
        options
    }

    /// Results file from `[output]`, or the default name in the working directory
    pub fn output_path(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.path.clone())
            .unwrap_or_else(|| PathBuf::from(COMBINED_RESULTS_FILE))
    }
}
