//! Robots.txt compliance
//!
//! [`ParsedRobots`] evaluates a robots.txt body for a user agent and URL.
//! [`RobotsComplianceChecker`] fetches robots.txt once per host, caches the
//! ruleset for the lifetime of the checker, and answers `is_allowed` queries.
//!
//! A robots.txt that cannot be fetched is cached as an allow-all ruleset. This
//! fail-open choice keeps unreachable robots files from blocking otherwise
//! compliant sources; it is never retried within a checker's lifetime.

mod checker;
mod parser;

pub use checker::{RobotsComplianceChecker, DEFAULT_ROBOTS_TIMEOUT};
pub use parser::{product_token, ParsedRobots};
