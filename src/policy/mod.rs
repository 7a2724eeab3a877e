//! Per-source policy bundles
//!
//! A [`SourcePolicy`] is created at configuration time and shared read-only by
//! every fetch made under that source. It carries the source's identity (user
//! agent), throughput limit, retry schedule and terms-of-use restrictions.

mod retry;
mod source;
mod terms;

pub use retry::RetryPolicy;
pub use source::SourcePolicy;
pub use terms::TermsPolicy;
