//! Two-stage EDI generation: clean up raw document text, then render it as
//! an EDI transaction.

use crate::client::ChatModel;
use crate::error::Result;
use crate::prompts::{build_edi_prompt, build_formatting_prompt};

/// Both stage outputs of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdiOutcome {
    /// Document type on the first line, followed by the structured text
    pub cleaned_text: String,
    /// The generated EDI document
    pub edi_document: String,
}

/// Clean-up → EDI generation over any [`ChatModel`].
#[derive(Debug)]
pub struct EdiPipeline<M> {
    model: M,
}

impl<M: ChatModel> EdiPipeline<M> {
    /// Build a pipeline on top of `model`
    #[must_use = "pipeline is created but not used"]
    pub const fn new(model: M) -> Self {
        Self { model }
    }

    /// The underlying model
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Stage 1: identify the document type and tidy the raw text.
    ///
    /// # Errors
    ///
    /// Propagates the model's error.
    pub async fn clean_up(&self, raw_text: &str) -> Result<String> {
        tracing::info!(raw_chars = raw_text.len(), "cleaning up document text");
        self.model.complete(&build_formatting_prompt(raw_text)).await
    }

    /// Stage 2: render cleaned text as an EDI document.
    ///
    /// # Errors
    ///
    /// Propagates the model's error.
    pub async fn generate_edi(&self, cleaned_text: &str) -> Result<String> {
        tracing::info!(cleaned_chars = cleaned_text.len(), "generating EDI document");
        self.model.complete(&build_edi_prompt(cleaned_text)).await
    }

    /// Run both stages in order; a clean-up failure skips generation.
    ///
    /// # Errors
    ///
    /// Returns the first stage error encountered.
    pub async fn run(&self, raw_text: &str) -> Result<EdiOutcome> {
        let cleaned_text = self.clean_up(raw_text).await?;
        let edi_document = self.generate_edi(&cleaned_text).await?;
        Ok(EdiOutcome {
            cleaned_text,
            edi_document,
        })
    }
}
