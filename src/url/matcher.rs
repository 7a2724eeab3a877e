/// Checks if a host matches a terms-policy domain pattern
///
/// Patterns are either an exact host (`"api.crossref.org"`) or a wildcard
/// (`"*.arxiv.org"`), which matches the base domain itself and any subdomain
/// of it. Both sides are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use paperclip::url::matches_wildcard;
///
/// assert!(matches_wildcard("api.crossref.org", "API.crossref.org"));
/// assert!(!matches_wildcard("crossref.org", "api.crossref.org"));
///
/// assert!(matches_wildcard("*.arxiv.org", "arxiv.org"));
/// assert!(matches_wildcard("*.arxiv.org", "export.arxiv.org"));
/// assert!(!matches_wildcard("*.arxiv.org", "notarxiv.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let candidate = candidate.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}

/// Returns true if `pattern` is a usable terms domain pattern
///
/// Accepts hosts made of alphanumerics, `.` and `-` (IPv4 literals included),
/// optionally prefixed with `*.`. Labels may not be empty.
pub fn is_valid_pattern(pattern: &str) -> bool {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && host
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}
