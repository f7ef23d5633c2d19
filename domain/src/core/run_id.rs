//! Run identifiers.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequence mixed into generated IDs so that runs started in the
/// same nanosecond still get distinct identifiers.
static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one `execute(intent)` run.
///
/// Stamped into every trail payload so a trail shared across concurrent runs
/// can still be split back into per-run histories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Creates a RunId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new RunId from the wall clock and a process-wide sequence.
    pub fn generate() -> Self {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default() as u64;
        let seq = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("run-{:012x}-{:04x}", nanos & 0xffff_ffff_ffff, seq & 0xffff))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
