//! Chat model configuration.
//!
//! Credentials come from the environment (`WATSONX_URL`, `WATSONX_API_KEY`,
//! `WATSONX_PROJECT_ID`), with a `.env` file in the working directory loaded
//! first when present. Missing credentials are not an error here; they
//! surface as [`LlmError::MissingConfig`] when the client is first used.

use std::time::Duration;

use crate::error::{LlmError, Result};

/// Environment variable holding the watsonx.ai service URL
pub const ENV_URL: &str = "WATSONX_URL";
/// Environment variable holding the IBM Cloud API key
pub const ENV_API_KEY: &str = "WATSONX_API_KEY";
/// Environment variable holding the watsonx.ai project id
pub const ENV_PROJECT_ID: &str = "WATSONX_PROJECT_ID";

/// Default chat model
pub const DEFAULT_MODEL_ID: &str = "meta-llama/llama-3-3-70b-instruct";
/// Default cap on generated tokens
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
/// Default nucleus-sampling mass
pub const DEFAULT_TOP_P: f64 = 1.0;

/// Everything the chat client needs, injected by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Service base URL (e.g. `https://us-south.ml.cloud.ibm.com`)
    pub endpoint: Option<String>,
    /// IBM Cloud API key, exchanged for a bearer token
    pub api_key: Option<String>,
    /// Project the inference is billed to
    pub project_id: Option<String>,
    /// Model identifier
    pub model_id: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus-sampling mass
    pub top_p: f64,
    /// Per-request timeout; `None` keeps the HTTP client's default
    pub timeout: Option<Duration>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            project_id: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            timeout: None,
        }
    }
}

impl LlmConfig {
    /// Load `.env` if present, then read credentials from the environment.
    #[must_use = "config is loaded but not used"]
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`; blank values count as unset.
    #[must_use = "config is built but not used"]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            endpoint: read(ENV_URL),
            api_key: read(ENV_API_KEY),
            project_id: read(ENV_PROJECT_ID),
            ..Self::default()
        }
    }

    /// Service URL without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingConfig`] naming `WATSONX_URL` if unset.
    pub fn endpoint(&self) -> Result<&str> {
        require(self.endpoint.as_deref(), ENV_URL).map(|url| url.trim_end_matches('/'))
    }

    /// API key.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingConfig`] naming `WATSONX_API_KEY` if unset.
    pub fn api_key(&self) -> Result<&str> {
        require(self.api_key.as_deref(), ENV_API_KEY)
    }

    /// Project id.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingConfig`] naming `WATSONX_PROJECT_ID` if unset.
    pub fn project_id(&self) -> Result<&str> {
        require(self.project_id.as_deref(), ENV_PROJECT_ID)
    }
}

fn require<'a>(value: Option<&'a str>, var: &str) -> Result<&'a str> {
    value.ok_or_else(|| LlmError::MissingConfig(var.to_string()))
}
