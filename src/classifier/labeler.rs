//! Prompt construction and the classifier entry point.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::openai::{CompletionClient, CompletionError};

use super::parser::parse_reply;

/// Article text → label, as returned by [`Classifier::classify`].
pub type Labels = BTreeMap<String, String>;

/// The closed set of labels the classifier may assign.
pub const LABEL_VOCABULARY: &[&str] = &[
    "Technology",
    "Artificial Intelligence",
    "NLP",
    "Music",
    "Programming",
    "Product Management",
    "Finance",
    "Design",
    "Coaching",
    "User Experience",
    "Business",
    "Education",
    "Social Media",
    "Lifestyle",
    "Entertainment",
    "Health",
    "Management",
    "Other/Unknown",
];

const PROMPT_PREAMBLE: &str = r#"You are a precise classifier. Use the following categories and only the following categories:

{vocabulary}

Classify each of the internet articles below into exactly one category. For every article answer with two lines, a line "Article: <article name>" followed by a line "Label: <category>", and nothing else.

---------------------------

"#;

/// Renders the classification prompt for a batch of article titles.
///
/// The preamble lists [`LABEL_VOCABULARY`] and is followed by one
/// `Article: <text>` line per title, in input order.
///
/// # Examples
///
/// ```
/// use droptag::classifier::build_prompt;
///
/// let prompt = build_prompt(&["Foo".to_string(), "Bar".to_string()]);
/// assert!(prompt.ends_with("Article: Foo\nArticle: Bar\n"));
/// ```
pub fn build_prompt(articles: &[String]) -> String {
    let mut prompt = PROMPT_PREAMBLE.replace("{vocabulary}", &LABEL_VOCABULARY.join(", "));
    for article in articles {
        prompt.push_str("Article: ");
        prompt.push_str(article);
        prompt.push('\n');
    }
    prompt
}

/// Classifies batches of article titles with a completion model.
pub struct Classifier {
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl Classifier {
    /// Creates a classifier that sends requests for `model` through `client`.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Returns the model name used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classifies `articles` with a single completion request.
    ///
    /// Batches of zero or one article return an empty mapping without
    /// contacting the API.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` if the request fails. Nothing is retried.
    /// A reply that cannot be parsed is not an error; it yields fewer (or no)
    /// labels.
    pub fn classify(&self, articles: &[String]) -> Result<Labels, CompletionError> {
        if articles.len() <= 1 {
            return Ok(Labels::new());
        }

        let prompt = build_prompt(articles);

        let start = Instant::now();
        let reply = self.client.complete(&self.model, &prompt)?;
        tracing::info!(
            model = %self.model,
            articles = articles.len(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "classifier responded"
        );

        Ok(parse_reply(&reply))
    }
}
