//! URL helpers shared by the policy gates
//!
//! Host extraction for the terms gate, authority keys and robots.txt locations
//! for the robots gate, and wildcard matching for terms domain patterns.

mod domain;
mod matcher;

pub use domain::{extract_domain, parse_http_url, robots_cache_key, robots_url};
pub use matcher::{is_valid_pattern, matches_wildcard};
