//! Human-readable metrics summary

use crate::metrics::MetricsSnapshot;

/// Formats a snapshot as a multi-line summary
pub fn format_metrics(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::from("=== Fetch Metrics ===\n");
    out.push_str(&format!("  Successes: {}\n", snapshot.successes));
    out.push_str(&format!("  Failures:  {}\n", snapshot.failures));
    out.push_str(&format!("  Retries:   {}\n", snapshot.retries));

    if let (Some(at), Some(reason)) = (&snapshot.last_failure_at, &snapshot.last_failure_reason) {
        out.push_str(&format!("  Last failure ({}): {}\n", at.to_rfc3339(), reason));
    }

    let attempts = snapshot.successes + snapshot.failures;
    let success_rate = if attempts > 0 {
        (snapshot.successes as f64 / attempts as f64) * 100.0
    } else {
        0.0
    };
    out.push_str(&format!(
        "  Success rate: {:.1}% ({} / {} recorded outcomes)\n",
        success_rate, snapshot.successes, attempts
    ));

    out
}

/// Prints a snapshot summary to stdout
pub fn print_metrics(snapshot: &MetricsSnapshot) {
    print!("{}", format_metrics(snapshot));
}
