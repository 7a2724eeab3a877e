//! Append-only failure reason sinks

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Durable sink for failure reasons
///
/// Callers treat sinks as best-effort: an error returned here is logged and
/// otherwise ignored, it never fails a fetch.
pub trait FailureSink: Send + Sync {
    fn log(&self, message: &str) -> io::Result<()>;
}

/// Appends one line per failure to a text file
#[derive(Debug)]
pub struct FileFailureLogger {
    path: PathBuf,
    // Serializes appends so concurrent lines never interleave
    write_lock: Mutex<()>,
}

impl FileFailureLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FailureSink for FileFailureLogger {
    fn log(&self, message: &str) -> io::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", message)
    }
}
