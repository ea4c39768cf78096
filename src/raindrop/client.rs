/// Raindrop.io HTTP client implementation.
///
/// This module provides `RaindropClient` for making synchronous HTTP requests to the
/// Raindrop.io REST API, along with error types and builder patterns for configuration.
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::models::BookmarkId;

const DEFAULT_BASE_URL: &str = "https://api.raindrop.io/rest/v1";

/// Errors that can occur when interacting with the Raindrop.io API.
#[derive(Debug, Error)]
pub enum RaindropError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code and response body
    #[error("HTTP error: status {status}: {body}")]
    Http { status: u16, body: String },

    /// JSON deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Raindrop API-specific errors (`"result": false`)
    #[error("Raindrop API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No API token was configured
    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),
}

impl From<reqwest::Error> for RaindropError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RaindropError::Timeout(error)
        } else {
            RaindropError::Network(error)
        }
    }
}

/// A bookmark as returned by the search endpoint, before title normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawBookmark {
    #[serde(rename = "_id")]
    pub id: BookmarkId,
    #[serde(default)]
    pub title: String,
}

/// Operations the pipeline needs from the bookmarking service.
///
/// This trait enables mocking in unit tests.
pub trait BookmarkService: Send + Sync {
    /// Fetches one page of bookmarks from a collection.
    ///
    /// Pages are zero-indexed. An empty page marks the end of the collection.
    fn search_page(
        &self,
        collection_id: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawBookmark>, RaindropError>;

    /// Replaces the tag set of a bookmark.
    ///
    /// Replacing with the same tags again must leave the bookmark unchanged.
    fn update_tags(&self, id: BookmarkId, tags: &[String]) -> Result<(), RaindropError>;
}

/// Builder for constructing `RaindropClient` instances.
///
/// # Examples
///
/// ```
/// use droptag::raindrop::RaindropClientBuilder;
///
/// let client = RaindropClientBuilder::new()
///     .api_key("test-token")
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct RaindropClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl RaindropClientBuilder {
    /// Creates a new `RaindropClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the REST API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builds the `RaindropClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, `RAINDROP_BASE_URL` is used, falling back to
    /// `https://api.raindrop.io/rest/v1`. If `api_key()` was not called, `RAINDROP_KEY`
    /// is used; a missing or empty token is an error.
    pub fn build(self) -> Result<RaindropClient, RaindropError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => std::env::var("RAINDROP_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        let api_key = match self.api_key {
            Some(key) => key,
            None => std::env::var("RAINDROP_KEY").unwrap_or_default(),
        };
        if api_key.trim().is_empty() {
            return Err(RaindropError::MissingApiKey("RAINDROP_KEY"));
        }

        reqwest::Url::parse(&base_url)
            .map_err(|e| RaindropError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(RaindropError::Network)?;

        Ok(RaindropClient {
            client,
            base_url,
            api_key,
        })
    }
}

/// Synchronous HTTP client for the Raindrop.io REST API.
///
/// It should be constructed using `RaindropClientBuilder`.
pub struct RaindropClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl RaindropClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, collection_id: i64) -> String {
        format!("{}/raindrops/{}", self.base_url, collection_id)
    }

    fn update_url(&self, id: BookmarkId) -> String {
        format!("{}/raindrop/{}", self.base_url, id)
    }
}

impl BookmarkService for RaindropClient {
    fn search_page(
        &self,
        collection_id: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawBookmark>, RaindropError> {
        let response = self
            .client
            .get(self.search_url(collection_id))
            .bearer_auth(&self.api_key)
            .query(&[("page", page), ("perpage", per_page)])
            .send()?;

        let body = read_success_body(response)?;
        parse_search_response(&body)
    }

    fn update_tags(&self, id: BookmarkId, tags: &[String]) -> Result<(), RaindropError> {
        let response = self
            .client
            .put(self.update_url(id))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "tags": tags }))
            .send()?;

        let body = read_success_body(response)?;
        parse_update_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Option<bool>,
    #[serde(default)]
    items: Vec<RawBookmark>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    #[serde(default)]
    result: Option<bool>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

fn read_success_body(response: reqwest::blocking::Response) -> Result<String, RaindropError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(RaindropError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn api_error(message: Option<String>) -> RaindropError {
    RaindropError::Api {
        message: message.unwrap_or_else(|| "request rejected".to_string()),
    }
}

fn parse_search_response(body: &str) -> Result<Vec<RawBookmark>, RaindropError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(RaindropError::Serialization)?;
    if parsed.result == Some(false) {
        return Err(api_error(parsed.error_message));
    }
    Ok(parsed.items)
}

fn parse_update_response(body: &str) -> Result<(), RaindropError> {
    let parsed: UpdateResponse =
        serde_json::from_str(body).map_err(RaindropError::Serialization)?;
    if parsed.result == Some(false) {
        return Err(api_error(parsed.error_message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn http_error_includes_status_and_body() {
        let error = RaindropError::Http {
            status: 401,
            body: "Unauthorized".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("Unauthorized"));
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let error = RaindropError::MissingApiKey("RAINDROP_KEY");
        assert_eq!(error.to_string(), "Missing API key: set RAINDROP_KEY");
    }

    #[test]
    fn search_response_parses_items() {
        let body = r#"{"result":true,"items":[{"_id":101,"title":"Rust 2024","link":"https://x"},{"_id":102,"title":"Jazz!"}],"count":2}"#;
        let items = parse_search_response(body).unwrap();
        assert_eq!(
            items,
            vec![
                RawBookmark {
                    id: BookmarkId::new(101),
                    title: "Rust 2024".to_string()
                },
                RawBookmark {
                    id: BookmarkId::new(102),
                    title: "Jazz!".to_string()
                },
            ]
        );
    }

    #[test]
    fn search_response_with_missing_title_defaults_to_empty() {
        let items = parse_search_response(r#"{"items":[{"_id":5}]}"#).unwrap();
        assert_eq!(items[0].title, "");
    }

    #[test]
    fn search_response_empty_page() {
        let items = parse_search_response(r#"{"result":true,"items":[]}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn search_response_result_false_is_api_error() {
        let result =
            parse_search_response(r#"{"result":false,"errorMessage":"Collection not found"}"#);
        match result {
            Err(RaindropError::Api { message }) => assert_eq!(message, "Collection not found"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn search_response_invalid_json_is_serialization_error() {
        let result = parse_search_response("<html>bad gateway</html>");
        assert!(matches!(result, Err(RaindropError::Serialization(_))));
    }

    #[test]
    fn update_response_result_false_is_api_error() {
        assert!(parse_update_response(r#"{"result":true,"item":{}}"#).is_ok());
        assert!(matches!(
            parse_update_response(r#"{"result":false}"#),
            Err(RaindropError::Api { .. })
        ));
    }

    #[test]
    fn urls_are_built_from_base_url() {
        let client = RaindropClientBuilder::new()
            .base_url("http://localhost:9000/rest/v1/")
            .api_key("token")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/rest/v1");
        assert_eq!(
            client.search_url(-1),
            "http://localhost:9000/rest/v1/raindrops/-1"
        );
        assert_eq!(
            client.update_url(BookmarkId::new(77)),
            "http://localhost:9000/rest/v1/raindrop/77"
        );
    }

    #[test]
    fn build_returns_error_if_invalid_url_provided() {
        let result = RaindropClientBuilder::new()
            .base_url("not-a-valid-url")
            .api_key("token")
            .build();
        assert!(matches!(result, Err(RaindropError::InvalidUrl(_))));
    }

    #[test]
    #[serial]
    fn build_requires_api_key() {
        unsafe {
            std::env::remove_var("RAINDROP_KEY");
        }
        let result = RaindropClientBuilder::new().build();
        assert!(matches!(result, Err(RaindropError::MissingApiKey(_))));
    }

    #[test]
    #[serial]
    fn build_reads_environment_variables() {
        unsafe {
            std::env::set_var("RAINDROP_KEY", "env-token");
            std::env::set_var("RAINDROP_BASE_URL", "http://env-host:8080/rest/v1");
        }

        let client = RaindropClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url(), "http://env-host:8080/rest/v1");
        assert_eq!(client.api_key, "env-token");

        unsafe {
            std::env::remove_var("RAINDROP_KEY");
            std::env::remove_var("RAINDROP_BASE_URL");
        }
    }

    #[test]
    #[serial]
    fn builder_values_take_precedence_over_environment() {
        unsafe {
            std::env::set_var("RAINDROP_BASE_URL", "http://env-host:8080");
        }

        let client = RaindropClientBuilder::new()
            .base_url("http://builder-host:8080")
            .api_key("builder-token")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://builder-host:8080");

        unsafe {
            std::env::remove_var("RAINDROP_BASE_URL");
        }
    }

    #[test]
    fn trait_can_be_implemented_by_mock_struct() {
        struct EmptyService;

        impl BookmarkService for EmptyService {
            fn search_page(&self, _: i64, _: u32, _: u32) -> Result<Vec<RawBookmark>, RaindropError> {
                Ok(Vec::new())
            }

            fn update_tags(&self, _: BookmarkId, _: &[String]) -> Result<(), RaindropError> {
                Ok(())
            }
        }

        let service: &dyn BookmarkService = &EmptyService;
        assert!(service.search_page(1, 0, 50).unwrap().is_empty());
        assert!(service.update_tags(BookmarkId::new(1), &["Music".to_string()]).is_ok());
    }
}
