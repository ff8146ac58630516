use url::Url;

/// Builds the key used to track per-host politeness and robots.txt state
///
/// The key is the lowercase host, followed by `:port` when the URL carries a
/// non-default port, so two servers on one machine are treated separately.
/// Returns `None` for URLs without a host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use keyword_scout::url::host_key;
///
/// let url = Url::parse("https://EXAMPLE.gov/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.gov".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
