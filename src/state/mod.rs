//! Shared admission state for the fetch pipeline
//!
//! This module holds the sliding-window [`RateLimiter`] that every fetch
//! consults before touching the network. The limiter owns its own lock and is
//! shared by reference, never through process-wide statics.

mod rate_limiter;

pub use rate_limiter::{RateLimitDecision, RateLimiter, DEFAULT_WINDOW};
