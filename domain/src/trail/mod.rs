//! Cognitive trail: the append-only audit record of phase transitions.
//!
//! Every run appends entries in phase order (Plan, Make per step, Check,
//! Reflect). A trail may be shared by concurrent runs, in which case entries
//! of different runs interleave; each entry carries its `runId` in the
//! payload so a single run's history can be recovered.
//!
//! Backends implement [`CognitiveTrail`]. [`InMemoryTrail`] lives here; the
//! JSONL-file trail lives in the infrastructure layer.

use crate::orchestration::entities::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Payload key holding the run identifier.
pub const RUN_ID_KEY: &str = "runId";

/// One phase transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailEntry {
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

impl TrailEntry {
    pub fn new(phase: Phase, payload: Value) -> Self {
        Self {
            phase,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// The run this entry belongs to, if recorded.
    pub fn run_id(&self) -> Option<&str> {
        self.payload.get(RUN_ID_KEY).and_then(Value::as_str)
    }
}

/// Append-only store of [`TrailEntry`] values.
///
/// `append` must be atomic with respect to concurrent callers: an entry is
/// either fully visible in `history` or not at all.
pub trait CognitiveTrail: Send + Sync {
    /// Record an entry.
    fn append(&self, entry: TrailEntry);

    /// Snapshot of the retained entries in insertion order.
    fn history(&self) -> Vec<TrailEntry>;

    /// Remove every entry.
    fn clear(&self);

    /// Entries recorded for one run, in insertion order.
    fn history_for(&self, run_id: &str) -> Vec<TrailEntry> {
        self.history()
            .into_iter()
            .filter(|entry| entry.run_id() == Some(run_id))
            .collect()
    }
}

/// Process-local trail, optionally bounded to the most recent N entries.
#[derive(Debug, Default)]
pub struct InMemoryTrail {
    entries: Mutex<VecDeque<TrailEntry>>,
    retention: Option<usize>,
}

impl InMemoryTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` entries, dropping the oldest first.
    pub fn with_retention(mut self, limit: usize) -> Self {
        self.retention = Some(limit);
        self
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<TrailEntry>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CognitiveTrail for InMemoryTrail {
    fn append(&self, entry: TrailEntry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        if let Some(limit) = self.retention {
            while entries.len() > limit {
                entries.pop_front();
            }
        }
    }

    fn history(&self) -> Vec<TrailEntry> {
        self.lock().iter().cloned().collect()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
