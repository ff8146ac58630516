use url::Url;

/// File type recorded when the URL carries no recognizable extension
pub const DEFAULT_FILE_TYPE: &str = "html";

/// Guesses a coarse content type for a URL from its path extension
///
/// Returns the MIME type guessed from the last path segment, or `"html"`
/// when nothing can be guessed (extensionless paths are almost always pages).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use keyword_scout::url::guess_file_type;
///
/// let url = Url::parse("https://example.gov/budget/fy2024.pdf").unwrap();
/// assert_eq!(guess_file_type(&url), "application/pdf");
///
/// let url = Url::parse("https://example.gov/finance").unwrap();
/// assert_eq!(guess_file_type(&url), "html");
/// ```
pub fn guess_file_type(url: &Url) -> String {
    mime_guess::from_path(url.path())
        .first_raw()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| DEFAULT_FILE_TYPE.to_string())
}
