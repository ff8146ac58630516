use crate::UrlError;
use url::Url;

/// Tracking query parameters dropped during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid"];

/// Normalizes a URL into the form used for per-job deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host (the parser already lowercases it)
/// 4. Collapse repeated slashes in the path; empty path becomes `/`
/// 5. Remove the fragment
/// 6. Remove tracking query parameters (`utm_*`, click ids)
/// 7. Sort remaining query parameters; drop an empty query string
///
/// The scheme, port and `www.` prefix are preserved, so the normalized URL
/// is still the address that gets fetched.
///
/// # Examples
///
/// ```
/// use keyword_scout::url::normalize_url;
///
/// let url = normalize_url("https://Example.gov//budget?utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.gov/budget");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(UrlError::MissingHost);
    }

    let path = collapse_slashes(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Collapses runs of `/` into a single slash, keeping a trailing slash
fn collapse_slashes(path: &str) -> String {
    let mut result = String::with_capacity(path.len().max(1));
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        result.push(c);
    }

    if result.is_empty() {
        result.push('/');
    }

    result
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
