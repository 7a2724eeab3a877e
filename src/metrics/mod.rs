//! Fetch outcome metrics
//!
//! This module provides:
//! - [`MetricsRecorder`]: shared success/retry/failure counters and the full
//!   failure log
//! - [`MetricsSnapshot`]: an immutable point-in-time copy of the counters
//! - [`FailureSink`] and [`FileFailureLogger`]: the optional durable failure log
//! - [`print_metrics`]: the human-readable summary used by the CLI

mod failure_log;
mod recorder;
mod report;

pub use failure_log::{FailureSink, FileFailureLogger};
pub use recorder::{FailureKind, FailureRecord, MetricsRecorder, MetricsSnapshot};
pub use report::{format_metrics, print_metrics};
