//! docedi: scanned business documents to structured data and EDI
//!
//! Commands:
//! - `extract`: layout extraction into `combined_extraction_results.json`
//! - `ocr`: tesseract text, optionally word-level through reading-order
//!   reconstruction
//! - `reflow`: reading order for a pre-computed detections file
//! - `edi`: raw text → LLM clean-up → LLM EDI generation

mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docedi_core::{reconstruct_text, JsonSerializer};
use docedi_llm::{EdiPipeline, LlmConfig, WatsonxClient};
use docedi_ocr::{
    extract_layout, DetectionsFile, DoclingCli, ExportedJson, LayoutConverter, OcrBackend,
    Tesseract,
};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "docedi",
    about = "Turn scanned purchase orders and invoices into structured data and EDI",
    long_about = "Turn scanned purchase orders and invoices into structured data and EDI.\n\
                  \n\
                  LLM credentials are read from WATSONX_URL, WATSONX_API_KEY and\n\
                  WATSONX_PROJECT_ID (a .env file in the working directory is loaded first).\n\
                  Defaults can be set via .docedi.toml configuration file.",
    version
)]
struct Args {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this configuration file instead of ./.docedi.toml and ~/.docedi.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract key/value pairs, sections and tables from a document image
    Extract {
        /// Document image
        image: PathBuf,

        /// Results file (default: combined_extraction_results.json)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Use a previously exported docling JSON instead of running docling
        #[arg(long, value_name = "PATH")]
        layout_json: Option<PathBuf>,
    },

    /// Recognize text with tesseract
    Ocr {
        /// Document image
        image: PathBuf,

        /// Language pack (repeatable, default: eng)
        #[arg(short, long = "lang", value_name = "LANG")]
        lang: Vec<String>,

        /// Page segmentation mode
        #[arg(long)]
        psm: Option<u8>,

        /// OCR engine mode
        #[arg(long)]
        oem: Option<u8>,

        /// Skip grayscale + Otsu binarization
        #[arg(long)]
        no_preprocess: bool,

        /// Recognize words and rebuild lines by position
        #[arg(long)]
        words: bool,
    },

    /// Rebuild reading order from an EasyOCR-style detections JSON file
    Reflow {
        /// Detections file: `[[[x, y] x4], "text", confidence]` triples
        detections: PathBuf,
    },

    /// Generate an EDI document from a document image
    Edi {
        /// Document image
        image: PathBuf,

        /// Where the raw text comes from
        #[arg(long, value_enum, default_value_t = TextSource::Docling)]
        source: TextSource,

        /// Use a previously exported docling JSON (docling source only)
        #[arg(long, value_name = "PATH")]
        layout_json: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TextSource {
    /// Markdown from docling layout conversion
    Docling,
    /// Tesseract plain text
    Ocr,
    /// Tesseract words through reading-order reconstruction
    Words,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "docedi=debug" } else { "docedi=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Report an input that is not a regular file the way every command does;
/// `true` means stop.
fn report_missing(path: &Path) -> bool {
    if path.is_file() {
        return false;
    }
    println!("❌ File not found: {}", path.display());
    true
}

fn layout_converter(layout_json: Option<PathBuf>) -> Box<dyn LayoutConverter> {
    match layout_json {
        Some(path) => Box::new(ExportedJson::new(path)),
        None => Box::new(DoclingCli::default()),
    }
}

fn run_extract(
    config: &Config,
    image: &Path,
    output: Option<PathBuf>,
    layout_json: Option<PathBuf>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| config.output_path());
    println!("Processing image: {}", image.display());

    let converter = layout_converter(layout_json);
    match extract_layout(converter.as_ref(), image) {
        Ok(extraction) => {
            JsonSerializer::new()
                .write_extraction(&output, image, &extraction)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✅ Results written to {}", output.display());
        }
        Err(e) => {
            println!("❌ Error processing {}: {e}", image.display());
            println!("❌ No results generated.");
        }
    }
    Ok(())
}

fn run_ocr(tesseract: &Tesseract, image: &Path, words: bool) -> Result<String> {
    let text = if words {
        tesseract.reading_order_text(image)
    } else {
        tesseract.image_to_string(image)
    };
    text.with_context(|| format!("OCR failed for {}", image.display()))
}

async fn run_edi(
    config: &Config,
    image: &Path,
    source: TextSource,
    layout_json: Option<PathBuf>,
) -> Result<()> {
    let raw_text = match source {
        TextSource::Docling => {
            layout_converter(layout_json)
                .convert(image)
                .with_context(|| format!("Layout conversion failed for {}", image.display()))?
                .markdown
        }
        TextSource::Ocr => run_ocr(&Tesseract::new(config.tesseract_options()), image, false)?,
        TextSource::Words => run_ocr(&Tesseract::new(config.tesseract_options()), image, true)?,
    };
    println!("{raw_text}");

    let llm = config.apply_llm(LlmConfig::from_env());
    let mut client = WatsonxClient::new(llm).context("Failed to build LLM client")?;
    if let Some(url) = config.iam_url() {
        client = client.with_iam_url(url);
    }
    let pipeline = EdiPipeline::new(client);

    let cleaned = pipeline
        .clean_up(&raw_text)
        .await
        .context("Clean-up stage failed")?;
    println!("\n🧾 Cleaned & Formatted Text:\n");
    println!("{cleaned}");

    let edi = pipeline
        .generate_edi(&cleaned)
        .await
        .context("EDI generation stage failed")?;
    println!("\n📄 EDI Document Generated:\n");
    println!("{edi}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::load(args.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match args.command {
        Commands::Extract {
            image,
            output,
            layout_json,
        } => {
            if report_missing(&image) {
                return Ok(());
            }
            run_extract(&config, &image, output, layout_json)
        }
        Commands::Ocr {
            image,
            lang,
            psm,
            oem,
            no_preprocess,
            words,
        } => {
            if report_missing(&image) {
                return Ok(());
            }
            let mut options = config.tesseract_options();
            if !lang.is_empty() {
                options.languages = lang;
            }
            if let Some(psm) = psm {
                options.psm = psm;
            }
            if let Some(oem) = oem {
                options.oem = oem;
            }
            if no_preprocess {
                options.preprocess = false;
            }
            let text = run_ocr(&Tesseract::new(options), &image, words)?;
            print!("{text}");
            Ok(())
        }
        Commands::Reflow { detections: path } => {
            if report_missing(&path) {
                return Ok(());
            }
            let detections = DetectionsFile::new(&path)
                .load()
                .with_context(|| format!("Failed to read detections from {}", path.display()))?;
            print!("{}", reconstruct_text(&detections));
            Ok(())
        }
        Commands::Edi {
            image,
            source,
            layout_json,
        } => {
            if report_missing(&image) {
                return Ok(());
            }
            run_edi(&config, &image, source, layout_json).await
        }
    }
}
