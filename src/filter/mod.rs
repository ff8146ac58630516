//! Link filtering heuristics
//!
//! Decides, from the raw `href` and its anchor text alone, whether a
//! discovered link is worth fetching. The checks are cheap string tests and
//! run before the link is resolved or enqueued.

use crate::config::FilterConfig;

/// Href prefixes that never point at a fetchable document
const NON_DOCUMENT_PREFIXES: &[&str] = &["#", "mailto:", "tel:", "javascript:", "data:"];

/// Predicate over discovered anchors
///
/// All pattern lists are lowercased once at construction so
/// [`LinkFilter::should_follow`] does no allocation beyond lowercasing its
/// inputs.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    ignored_extensions: Vec<String>,
    skip_words: Vec<String>,
    nav_patterns: Vec<String>,
}

impl LinkFilter {
    /// Builds a filter from the `[filter]` configuration section
    pub fn new(config: &FilterConfig) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Self {
            ignored_extensions: lower(&config.ignored_extensions),
            skip_words: lower(&config.skip_words),
            nav_patterns: lower(&config.nav_patterns),
        }
    }

    /// Returns whether the link should be fetched and scored
    ///
    /// # Arguments
    ///
    /// * `link` - The `href` value as it appears in the page
    /// * `anchor_text` - The visible text of the anchor (may be empty)
    ///
    /// # Rejects
    ///
    /// - paths ending in an ignored extension (case-insensitive)
    /// - fragment, `mailto:`, `tel:`, `javascript:` and `data:` links
    /// - anchors whose text contains a skip word
    /// - links pointing at a social or navigation site
    /// - links carrying more than one `?`
    pub fn should_follow(&self, link: &str, anchor_text: &str) -> bool {
        let link = link.trim();
        if link.is_empty() {
            return false;
        }

        let lowered = link.to_lowercase();

        if NON_DOCUMENT_PREFIXES
            .iter()
            .any(|prefix| lowered.starts_with(prefix))
        {
            return false;
        }

        if self.has_ignored_extension(&lowered) {
            return false;
        }

        let anchor = anchor_text.to_lowercase();
        if self.skip_words.iter().any(|word| anchor.contains(word)) {
            return false;
        }

        if self
            .nav_patterns
            .iter()
            .any(|pattern| lowered.contains(pattern))
        {
            return false;
        }

        if link.matches('?').count() > 1 {
            return false;
        }

        true
    }

    /// Checks the path part of the link, ignoring any query or fragment
    fn has_ignored_extension(&self, lowered_link: &str) -> bool {
        let path = lowered_link
            .split(['?', '#'])
            .next()
            .unwrap_or(lowered_link);

        self.ignored_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}
