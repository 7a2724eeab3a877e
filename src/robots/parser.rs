//! Robots.txt rule evaluation

use robotstxt::DefaultMatcher;

/// Parsed robots.txt ruleset for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    /// Raw robots.txt body, evaluated on demand
    content: String,
    /// Set when robots.txt was unavailable and everything is permitted
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a ruleset from a robots.txt body
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a ruleset from raw response bytes, replacing invalid UTF-8
    pub fn from_bytes(body: &[u8]) -> Self {
        Self::from_content(&String::from_utf8_lossy(body))
    }

    /// The empty ruleset used when robots.txt could not be obtained
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// True if this is the fail-open ruleset
    pub fn is_allow_all(&self) -> bool {
        self.allow_all
    }

    /// Checks whether `user_agent` may fetch `url`
    ///
    /// `url` may be an absolute URL or a path. The user agent is reduced to its
    /// product token before group matching, so `"PaperclipBot/1.0 (+mailto:x)"`
    /// obeys `User-agent: PaperclipBot` groups.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token(user_agent), url)
    }
}

/// Returns the product token of a user agent string
///
/// # Examples
///
/// ```
/// use paperclip::robots::product_token;
///
/// assert_eq!(product_token("PaperclipBot/1.0 (+mailto:ops@example.org)"), "PaperclipBot");
/// assert_eq!(product_token("curl"), "curl");
/// ```
pub fn product_token(user_agent: &str) -> &str {
    user_agent
        .trim()
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or_default()
}
