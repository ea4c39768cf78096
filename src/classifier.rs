//! Batch classification of article titles into a closed label vocabulary.
//!
//! A batch of normalized titles is rendered into one prompt, sent as a single
//! completion request, and the reply is parsed back into article/label pairs.
//!
//! # Reply format
//!
//! The model is asked to answer with alternating lines:
//!
//! ```text
//! Article: <title>
//! Label: <label>
//! ```
//!
//! Parsing is positional and lives entirely in [`parse_reply`]; see its
//! documentation for how blank lines, stray whitespace and malformed records
//! are treated.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use droptag::classifier::Classifier;
//! use droptag::openai::OpenAiClientBuilder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClientBuilder::new().build()?;
//! let classifier = Classifier::new(Arc::new(client), "gpt-3.5-turbo");
//!
//! let labels = classifier.classify(&[
//!     "Understanding transformers".to_string(),
//!     "Chord progressions for beginners".to_string(),
//! ])?;
//! for (article, label) in &labels {
//!     println!("{article}: {label}");
//! }
//! # Ok(())
//! # }
//! ```

mod labeler;
mod parser;

pub use labeler::{Classifier, LABEL_VOCABULARY, Labels, build_prompt};
pub use parser::parse_reply;
