use crate::UrlError;
use url::Url;

/// Normalizes a URL according to Sumi-Scroll's normalization rules
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not absolute
/// 2. Reject schemes other than http and https
/// 3. Drop the port when it is the scheme default (80 for http, 443 for https)
/// 4. Remove the query string
/// 5. Remove the fragment
/// 6. Remove trailing slashes from the path (the root path becomes empty)
///
/// Path case is preserved. Two URLs that differ only in default port,
/// trailing slash, query or fragment normalize to the same string.
///
/// # Examples
///
/// ```
/// use sumi_scroll::url::normalize_url;
///
/// let url = normalize_url("https://nextjs.org:443/docs/app/?ref=nav#intro").unwrap();
/// assert_eq!(url, "https://nextjs.org/docs/app");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(&url)
}

/// Normalizes an already parsed URL
pub fn normalize_parsed(url: &Url) -> Result<String, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let authority = authority(url).ok_or(UrlError::MissingHost)?;
    let path = url.path().trim_end_matches('/');

    Ok(format!("{}://{}{}", url.scheme(), authority, path))
}

/// Returns `host[:port]`, omitting the port when it is the scheme default
pub(crate) fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
