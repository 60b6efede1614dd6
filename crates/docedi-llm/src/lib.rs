//! # docedi-llm
//!
//! Hosted-LLM stages of the docedi pipeline.
//!
//! Raw document text (OCR output or layout markdown) goes through two
//! prompts against a [`ChatModel`]:
//!
//! 1. **Clean-up**: identify the document type and restructure the text
//! 2. **EDI generation**: render the cleaned text as an X12 transaction
//!    (850 for purchase orders, 810 for invoices)
//!
//! [`WatsonxClient`] is the production [`ChatModel`]; tests substitute
//! in-process fakes.
//!
//! ```no_run
//! use docedi_llm::{EdiPipeline, LlmConfig, WatsonxClient};
//!
//! # async fn example() -> docedi_llm::Result<()> {
//! let pipeline = EdiPipeline::new(WatsonxClient::new(LlmConfig::from_env())?);
//! let outcome = pipeline.run("PURCHASE ORDER\nPO# 4500012").await?;
//! println!("{}", outcome.edi_document);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;

pub use client::{parse_chat_response, ChatModel, WatsonxClient, CHAT_API_VERSION, IAM_TOKEN_URL};
pub use config::{
    LlmConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_ID, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
    ENV_API_KEY, ENV_PROJECT_ID, ENV_URL,
};
pub use error::{LlmError, Result};
pub use pipeline::{EdiOutcome, EdiPipeline};
pub use prompts::{build_edi_prompt, build_formatting_prompt};
