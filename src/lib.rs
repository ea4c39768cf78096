pub mod cache;
pub mod classifier;
pub mod config;
pub mod models;
pub mod openai;
pub mod pipeline;
pub mod raindrop;
pub mod reconciler;
pub mod source;

pub use cache::{CacheLoad, CacheStore, FingerprintCache};
pub use classifier::{Classifier, Labels};
pub use config::Config;
pub use models::{BookmarkId, BookmarkItem, CacheRecord, Fingerprint};
pub use openai::{CompletionClient, CompletionError, OpenAiClient, OpenAiClientBuilder};
pub use pipeline::{Pipeline, PipelineSettings, RunSummary};
pub use raindrop::{BookmarkService, RaindropClient, RaindropClientBuilder, RaindropError};
pub use reconciler::RateLimit;
