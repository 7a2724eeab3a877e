use crate::policy::{RetryPolicy, SourcePolicy, TermsPolicy};

const DEFAULT_USER_AGENT: &str = concat!("PaperclipBot/", env!("CARGO_PKG_VERSION"));

/// Built-in source set for the scholarly metadata APIs
///
/// Each source is restricted to its own API host and uses the default retry
/// schedule. Rate limits follow each provider's published guidance.
pub fn default_sources() -> Vec<SourcePolicy> {
    [
        ("arxiv", "export.arxiv.org", 20),
        ("crossref", "api.crossref.org", 50),
        ("semantic_scholar", "api.semanticscholar.org", 30),
    ]
    .into_iter()
    .map(|(name, host, rate)| {
        SourcePolicy::new(
            name,
            DEFAULT_USER_AGENT,
            rate,
            RetryPolicy::default(),
            TermsPolicy::new(Vec::<String>::new(), [host]),
        )
    })
    .collect()
}
