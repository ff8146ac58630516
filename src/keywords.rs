//! Keyword matching over extracted page text

/// Returns the keywords that occur in `text`, in the order they were given
///
/// Matching is a case-insensitive substring test. Duplicate keywords in the
/// input are reported once.
///
/// # Examples
///
/// ```
/// use keyword_scout::match_keywords;
///
/// let keywords = vec!["Budget".to_string(), "Audit".to_string(), "Bond".to_string()];
/// let matched = match_keywords("The adopted BUDGET and the annual audit", &keywords);
/// assert_eq!(matched, vec!["Budget", "Audit"]);
/// ```
pub fn match_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut matched: Vec<String> = Vec::new();

    for keyword in keywords {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() || matched.contains(keyword) {
            continue;
        }
        if haystack.contains(&needle) {
            matched.push(keyword.clone());
        }
    }

    matched
}
