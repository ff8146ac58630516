//! Anchor extraction from HTML pages

use scraper::{Html, Selector};
use url::Url;

/// An `<a href>` found on a page, before filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The `href` attribute exactly as written
    pub href: String,
    /// Visible text of the anchor, whitespace-collapsed
    pub text: String,
}

/// Extracts every `<a href>` in document order
///
/// Anchors carrying the `download` attribute are skipped. No other
/// filtering happens here; see [`crate::filter::LinkFilter`].
///
/// # Example
///
/// ```
/// use keyword_scout::crawler::extract_anchors;
///
/// let html = r#"<body><a href="/budget"> FY24  Budget </a></body>"#;
/// let anchors = extract_anchors(html);
/// assert_eq!(anchors[0].href, "/budget");
/// assert_eq!(anchors[0].text, "FY24 Budget");
/// ```
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let mut anchors = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                let text = element.text().collect::<Vec<_>>().join(" ");
                anchors.push(Anchor {
                    href: href.trim().to_string(),
                    text: text.split_whitespace().collect::<Vec<_>>().join(" "),
                });
            }
        }
    }

    anchors
}

/// Resolves an href against the page it was found on
///
/// Returns None for unparseable links and anything that is not HTTP(S)
/// after resolution.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
