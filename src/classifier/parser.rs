use super::labeler::Labels;

const ARTICLE_PREFIX: &str = "Article:";
const LABEL_PREFIX: &str = "Label:";

/// Parses a classifier reply into an article → label mapping.
///
/// # Contract
///
/// - Lines that are empty or whitespace-only are dropped.
/// - The remaining lines are read two at a time as `(article, label)`.
/// - Leading indentation and a trailing `\r` are ignored. After the
///   `Article:` prefix a single separating space is removed and the rest of
///   the article is kept exactly, since normalized titles may begin or end
///   with a space. Labels are trimmed.
/// - A line missing its prefix is taken verbatim, so misaligned replies pair
///   the wrong lines rather than failing; the reconciler reports articles it
///   cannot match.
/// - A trailing line without a partner is ignored.
/// - Records whose article or label is blank are ignored.
/// - If the same article appears twice, the later label wins.
///
/// # Examples
///
/// ```
/// use droptag::classifier::parse_reply;
///
/// let labels = parse_reply("Article: Foo\nLabel: Tech\n\nArticle: Bar \nLabel: Music\n");
/// assert_eq!(labels.get("Foo").map(String::as_str), Some("Tech"));
/// assert_eq!(labels.get("Bar ").map(String::as_str), Some("Music"));
/// ```
pub fn parse_reply(reply: &str) -> Labels {
    let lines: Vec<&str> = reply
        .lines()
        .map(|line| line.trim_start().trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect();

    let mut labels = Labels::new();
    for record in lines.chunks(2) {
        let [article_line, label_line] = record else {
            tracing::warn!(line = record[0], "classifier reply has a dangling line");
            continue;
        };

        let article = field(article_line, ARTICLE_PREFIX);
        let label = field(label_line, LABEL_PREFIX).trim();
        if article.trim().is_empty() || label.is_empty() {
            tracing::warn!(article_line, label_line, "classifier reply has an empty field");
            continue;
        }

        labels.insert(article.to_string(), label.to_string());
    }

    labels
}

/// Returns the value after `prefix`, minus one separating space.
fn field<'a>(line: &'a str, prefix: &str) -> &'a str {
    match line.strip_prefix(prefix) {
        Some(value) => value.strip_prefix(' ').unwrap_or(value),
        None => line,
    }
}
