use crate::policy::{RetryPolicy, TermsPolicy};
use serde::Deserialize;

/// Immutable policy bundle for one named source
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourcePolicy {
    /// Name used to select this policy in `Fetcher::fetch`
    pub name: String,

    /// User-Agent header sent with every request for this source
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Admitted requests per rate-limiter window
    #[serde(rename = "rate-limit-per-minute")]
    pub rate_limit_per_minute: u32,

    #[serde(rename = "retry", default)]
    pub retry_policy: RetryPolicy,

    #[serde(rename = "terms", default)]
    pub terms_policy: TermsPolicy,
}

impl SourcePolicy {
    pub fn new(
        name: impl Into<String>,
        user_agent: impl Into<String>,
        rate_limit_per_minute: u32,
        retry_policy: RetryPolicy,
        terms_policy: TermsPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            user_agent: user_agent.into(),
            rate_limit_per_minute,
            retry_policy,
            terms_policy,
        }
    }
}
