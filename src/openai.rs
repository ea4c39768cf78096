/// OpenAI-compatible chat completion client module.
///
/// This module provides a blocking client for single-turn chat completions,
/// along with error types and builder patterns for configuration.
mod client;

pub use client::{CompletionClient, CompletionError, OpenAiClient, OpenAiClientBuilder};
