use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a URL and requires both a scheme and a host
///
/// # Examples
///
/// ```
/// use paperclip::url::parse_http_url;
///
/// assert!(parse_http_url("https://example.com/a").is_ok());
/// assert!(parse_http_url("/relative/path").is_err());
/// assert!(parse_http_url("mailto:someone@example.com").is_err());
/// ```
pub fn parse_http_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => UrlError::MissingScheme,
        other => UrlError::Parse(other.to_string()),
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Extracts the lowercase host from a URL, without port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use paperclip::url::extract_domain;
///
/// let url = Url::parse("https://API.Crossref.org:8443/works").unwrap();
/// assert_eq!(extract_domain(&url), Some("api.crossref.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the key under which a host's robots.txt is cached
///
/// This is the URL authority: the lowercase host, plus the port when the URL
/// names one explicitly.
pub fn robots_cache_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Builds the robots.txt location for the scheme and authority of `url`
pub fn robots_url(url: &Url) -> UrlResult<Url> {
    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }
    url.join("/robots.txt")
        .map_err(|e| UrlError::Parse(e.to_string()))
}
