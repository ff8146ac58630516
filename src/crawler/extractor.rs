//! Main-content text extraction
//!
//! Pulls readable text out of an HTML page, preferring the main content
//! region and dropping navigation, scripts and other boilerplate.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Selectors tried in order to find the main content region
const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".main",
    ".post-content",
    ".entry-content",
];

/// Elements whose subtrees never contribute text
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe",
    "template", "svg",
];

/// Converts page bodies into capped plain text
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    max_chars: usize,
}

impl ContentExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Extracts readable text from an HTML body
    ///
    /// Returns None when the page holds no text once boilerplate is removed.
    /// The result is whitespace-collapsed and at most `max_chars` characters.
    pub fn extract(&self, raw_body: &str) -> Option<String> {
        let document = Html::parse_document(raw_body);

        let text = main_content_text(&document)
            .or_else(|| {
                Selector::parse("body")
                    .ok()
                    .and_then(|sel| document.select(&sel).next())
                    .map(element_text)
            })
            .unwrap_or_else(|| element_text(document.root_element()));

        self.finish(&text)
    }

    /// Extracts text from a plain-text body
    pub fn extract_plain(&self, raw_body: &str) -> Option<String> {
        self.finish(raw_body)
    }

    fn finish(&self, text: &str) -> Option<String> {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return None;
        }
        Some(truncate_chars(&collapsed, self.max_chars))
    }
}

fn main_content_text(document: &Html) -> Option<String> {
    for raw in MAIN_CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element_text(element);
            if !text.trim().is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if SKIPPED_TAGS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

/// Truncates to at most `max_chars` characters on a char boundary
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
