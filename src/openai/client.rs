/// OpenAI-compatible chat completion client implementation.
///
/// This module provides `OpenAiClient` for making synchronous HTTP requests to a
/// `/chat/completions` endpoint, along with error types and builder patterns for
/// configuration.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors that can occur when calling the completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code (auth failures, rate limits, server errors)
    #[error("HTTP error: status {status}: {body}")]
    Http { status: u16, body: String },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Completion API-specific errors
    #[error("Completion API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No API key was configured
    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),
}

impl From<reqwest::Error> for CompletionError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CompletionError::Timeout(error)
        } else {
            CompletionError::Network(error)
        }
    }
}

/// Trait for completion API operations.
///
/// This trait enables mocking in unit tests and provides a clean interface
/// for single-turn completions.
pub trait CompletionClient: Send + Sync {
    /// Sends `prompt` as a single user message and returns the reply text.
    ///
    /// # Arguments
    ///
    /// * `model` - The model name (e.g., "gpt-3.5-turbo")
    /// * `prompt` - The full prompt text
    fn complete(&self, model: &str, prompt: &str) -> Result<String, CompletionError>;
}

/// Builder for constructing `OpenAiClient` instances.
///
/// # Examples
///
/// ```
/// use droptag::openai::OpenAiClientBuilder;
///
/// let client = OpenAiClientBuilder::new()
///     .api_key("sk-test")
///     .base_url("http://localhost:8080/v1")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "http://localhost:8080/v1");
/// ```
#[derive(Debug, Default)]
pub struct OpenAiClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl OpenAiClientBuilder {
    /// Creates a new `OpenAiClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL (e.g., "https://api.openai.com/v1").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key sent as a bearer token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builds the `OpenAiClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// Unset builder values fall back to `OPENAI_BASE_URL` (default
    /// `https://api.openai.com/v1`) and `OPENAI_API_KEY` (required). The model
    /// is chosen per request by the caller.
    pub fn build(self) -> Result<OpenAiClient, CompletionError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => {
                std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            }
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        let api_key = match self.api_key {
            Some(key) => key,
            None => std::env::var("OPENAI_API_KEY").unwrap_or_default(),
        };
        if api_key.trim().is_empty() {
            return Err(CompletionError::MissingApiKey("OPENAI_API_KEY"));
        }

        reqwest::Url::parse(&base_url)
            .map_err(|e| CompletionError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        // Batches of fifteen titles can take a while to come back
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(CompletionError::Network)?;

        Ok(OpenAiClient {
            client,
            base_url,
            api_key,
        })
    }
}

/// Synchronous HTTP client for an OpenAI-compatible chat completion API.
///
/// Requests are sent once; failures are returned to the caller without retry.
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
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
    content: Option<String>,
}

impl OpenAiClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, model: &str, prompt: &str) -> Result<String, CompletionError> {
        let request = build_request(model, prompt);

        tracing::debug!(model, "chat completion request");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(&body)
    }
}

fn build_request<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    }
}

fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(CompletionError::Serialization)?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| CompletionError::Api {
            message: "Missing 'choices[0].message.content' in API response".to_string(),
        })
}
