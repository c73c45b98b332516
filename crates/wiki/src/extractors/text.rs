// ABOUTME: Paragraph text extraction for section and intro markup.
// ABOUTME: Concatenates the text of every <p> in a fragment, in document order.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Extract the text of all paragraphs in `markup`, concatenated with no separator.
///
/// Malformed or empty markup yields an empty string; html5ever recovers from
/// anything it is given, so there is no failure path.
pub fn extract_text(markup: &str) -> String {
    if markup.trim().is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(markup);
    fragment
        .select(&PARAGRAPH)
        .flat_map(|p| p.text())
        .collect()
}
