//! watsonx.ai chat client.
//!
//! Each request needs an IAM bearer token, obtained by exchanging the API key
//! at the IBM Cloud IAM endpoint. The token is cached on the client and
//! refreshed shortly before it expires.
//!
//! ```no_run
//! use docedi_llm::{ChatModel, LlmConfig, WatsonxClient};
//!
//! # async fn example() -> docedi_llm::Result<()> {
//! let client = WatsonxClient::new(LlmConfig::from_env())?;
//! let reply = client.complete("Say hello").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::LlmConfig;
use crate::error::{LlmError, Result};

/// IBM Cloud IAM token endpoint
pub const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// `version` query parameter sent to the chat endpoint
pub const CHAT_API_VERSION: &str = "2024-05-01";

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens this close to expiry are refreshed before use
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// A hosted model that turns a single user prompt into generated text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply to `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be reached or returns nothing.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model_id: &'a str,
    project_id: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// HTTP client for the watsonx.ai text chat API
#[derive(Debug)]
pub struct WatsonxClient {
    client: Client,
    config: LlmConfig,
    iam_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl WatsonxClient {
    /// Create a client.
    ///
    /// Credentials are not checked here; see [`LlmConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::HttpError`] if the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
            iam_url: IAM_TOKEN_URL.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Exchange API keys at a different IAM endpoint (e.g. a private cloud)
    #[must_use = "client is reconfigured but not used"]
    pub fn with_iam_url(mut self, url: impl Into<String>) -> Self {
        self.iam_url = url.into();
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Chat endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingConfig`] if the endpoint is unset.
    pub fn chat_url(&self) -> Result<String> {
        Ok(format!(
            "{}/ml/v1/text/chat?version={CHAT_API_VERSION}",
            self.config.endpoint()?
        ))
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> Result<ChatRequest<'a>> {
        Ok(ChatRequest {
            model_id: &self.config.model_id,
            project_id: self.config.project_id()?,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        })
    }

    async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        let api_key = self.config.api_key()?;
        tracing::debug!(url = %self.iam_url, "requesting IAM token");

        let response = self
            .client
            .post(&self.iam_url)
            .header("Accept", "application/json")
            .form(&[("grant_type", IAM_GRANT_TYPE), ("apikey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&response.text().await?)?;
        let fresh = CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        };
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

#[async_trait]
impl ChatModel for WatsonxClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self.chat_url()?;
        let body = self.request_body(prompt)?;
        let token = self.bearer_token().await?;

        tracing::info!(
            model = %self.config.model_id,
            prompt_chars = prompt.len(),
            "sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "chat request failed");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply = parse_chat_response(&response.text().await?)?;
        tracing::debug!(reply_chars = reply.len(), "chat reply received");
        Ok(reply)
    }
}

/// Pull `choices[0].message.content` out of a chat response body.
///
/// # Errors
///
/// Returns [`LlmError::ParseError`] for malformed JSON and
/// [`LlmError::EmptyResponse`] when there is no first choice or it has no
/// content.
pub fn parse_chat_response(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(LlmError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> LlmConfig {
        LlmConfig {
            endpoint: Some("https://us-south.ml.cloud.ibm.com/".to_string()),
            api_key: Some("key-123".to_string()),
            project_id: Some("proj-9".to_string()),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_chat_url() {
        let client = WatsonxClient::new(configured()).unwrap();
        assert_eq!(
            client.chat_url().unwrap(),
            "https://us-south.ml.cloud.ibm.com/ml/v1/text/chat?version=2024-05-01"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let client = WatsonxClient::new(configured()).unwrap();
        let body = serde_json::to_value(client.request_body("Hello").unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model_id": "meta-llama/llama-3-3-70b-instruct",
                "project_id": "proj-9",
                "messages": [{"role": "user", "content": "Hello"}],
                "max_tokens": 4000,
                "temperature": 0.3,
                "top_p": 1.0
            })
        );
    }

    #[test]
    fn test_parse_chat_response_first_choice() {
        let body = r#"{
            "id": "chat-1",
            "model_id": "meta-llama/llama-3-3-70b-instruct",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "ISA*00*"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;
        assert_eq!(parse_chat_response(body).unwrap(), "ISA*00*");
    }

    #[test]
    fn test_parse_chat_response_no_choices() {
        assert!(matches!(
            parse_chat_response(r#"{"choices": []}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            parse_chat_response("{}"),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_chat_response_missing_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant"}}]}"#;
        assert!(matches!(parse_chat_response(body), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn test_token_freshness_margin() {
        let now = Instant::now();
        let token = CachedToken {
            value: "t".to_string(),
            expires_at: now + Duration::from_secs(3600),
        };
        assert!(token.is_fresh(now));

        let nearly_expired = CachedToken {
            value: "t".to_string(),
            expires_at: now + Duration::from_secs(30),
        };
        assert!(!nearly_expired.is_fresh(now));
    }

    #[tokio::test]
    async fn test_missing_endpoint_fails_before_network() {
        let client = WatsonxClient::new(LlmConfig::default()).unwrap();
        let err = client.complete("Hello").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingConfig(var) if var == "WATSONX_URL"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let config = LlmConfig {
            api_key: None,
            ..configured()
        };
        let client = WatsonxClient::new(config).unwrap();
        let err = client.complete("Hello").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingConfig(var) if var == "WATSONX_API_KEY"));
    }

    #[tokio::test]
    async fn test_cached_token_reused() {
        let client = WatsonxClient::new(configured()).unwrap();
        *client.token.lock().await = Some(CachedToken {
            value: "cached-token".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        });
        assert_eq!(client.bearer_token().await.unwrap(), "cached-token");
    }
}
