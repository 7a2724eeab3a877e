use crate::url::matches_wildcard;
use serde::Deserialize;

/// Terms-of-use domain restrictions for a source
///
/// Each entry is an exact host or a `*.base` wildcard. A prohibited match
/// always denies. A non-empty allow-list closes the world: hosts that match no
/// allowed entry are denied even when they are not prohibited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TermsPolicy {
    #[serde(rename = "prohibited-domains", default)]
    pub prohibited_domains: Vec<String>,

    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,
}

impl TermsPolicy {
    /// Builds a policy from any iterables of domain patterns
    pub fn new<P, A>(prohibited: P, allowed: A) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            prohibited_domains: prohibited.into_iter().map(Into::into).collect(),
            allowed_domains: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// A policy that permits every domain
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Returns true if fetching from `domain` is permitted
    pub fn is_domain_allowed(&self, domain: &str) -> bool {
        if self
            .prohibited_domains
            .iter()
            .any(|pattern| matches_wildcard(pattern, domain))
        {
            return false;
        }

        if !self.allowed_domains.is_empty() {
            return self
                .allowed_domains
                .iter()
                .any(|pattern| matches_wildcard(pattern, domain));
        }

        true
    }
}
