use thiserror::Error;

/// Errors from the hosted chat model and the EDI pipeline.
#[derive(Error, Debug)]
pub enum LlmError {
    /// A required setting (endpoint, API key or project id) is unset
    #[error("Missing configuration: {0} is not set")]
    MissingConfig(String),

    /// Transport-level failure talking to the endpoint
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the service
        body: String,
    },

    /// A response body could not be decoded
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The model returned no choices
    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Result type alias for docedi-llm operations.
pub type Result<T> = std::result::Result<T, LlmError>;
