//! JSONL file-backed cognitive trail.
//!
//! Each [`TrailEntry`] is written as one JSON line:
//!
//! ```text
//! {"phase":"Make","timestamp":"2026-01-01T00:00:00.000Z","payload":{"runId":"...","tool":"echo",...}}
//! ```
//!
//! The file is opened in append mode and never rewritten. Reads are served
//! from an in-memory mirror, so `history` only covers entries appended
//! through this instance.

use pmcro_domain::{CognitiveTrail, InMemoryTrail, TrailEntry};
use serde_json::json;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Cognitive trail that persists entries to a JSONL file.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every entry and on
/// `Drop`.
pub struct JsonlCognitiveTrail {
    writer: Mutex<BufWriter<File>>,
    mirror: InMemoryTrail,
    path: PathBuf,
}

impl JsonlCognitiveTrail {
    /// Open (or create) the trail file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            mirror: InMemoryTrail::new(),
            path: path.to_path_buf(),
        })
    }

    /// Bound the in-memory mirror. The file keeps every entry.
    pub fn with_retention(mut self, limit: usize) -> Self {
        self.mirror = InMemoryTrail::new().with_retention(limit);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(entry: &TrailEntry) -> Option<String> {
        let record = json!({
            "phase": entry.phase,
            "timestamp": entry
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "payload": entry.payload,
        });
        serde_json::to_string(&record).ok()
    }
}

impl CognitiveTrail for JsonlCognitiveTrail {
    fn append(&self, entry: TrailEntry) {
        if let Some(line) = Self::encode(&entry) {
            let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                warn!("Could not write trail entry to {}: {}", self.path.display(), e);
            }
        }
        self.mirror.append(entry);
    }

    fn history(&self) -> Vec<TrailEntry> {
        self.mirror.history()
    }

    /// Clears the in-memory view only; the file is an append-only record.
    fn clear(&self) {
        self.mirror.clear();
    }
}

impl Drop for JsonlCognitiveTrail {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmcro_domain::Phase;
    use serde_json::Value;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trail.jsonl");
        let trail = JsonlCognitiveTrail::open(&path).unwrap();

        trail.append(TrailEntry::new(Phase::Plan, json!({"runId": "r1", "goal": "g"})));
        trail.append(TrailEntry::new(Phase::Make, json!({"runId": "r1", "tool": "echo"})));
        drop(trail);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["phase"], "Plan");
        assert_eq!(lines[0]["payload"]["goal"], "g");
        assert_eq!(lines[1]["phase"], "Make");
        assert!(lines[1]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trail.jsonl");

        let first = JsonlCognitiveTrail::open(&path).unwrap();
        first.append(TrailEntry::new(Phase::Plan, json!({"runId": "a"})));
        drop(first);

        let second = JsonlCognitiveTrail::open(&path).unwrap();
        second.append(TrailEntry::new(Phase::Plan, json!({"runId": "b"})));
        assert_eq!(second.history().len(), 1);
        drop(second);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["payload"]["runId"], "b");
    }

    #[test]
    fn test_clear_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trail.jsonl");
        let trail = JsonlCognitiveTrail::open(&path).unwrap();

        trail.append(TrailEntry::new(Phase::Check, json!({"runId": "r"})));
        trail.clear();
        assert!(trail.history().is_empty());
        drop(trail);

        assert_eq!(read_lines(&path).len(), 1);
    }

    #[test]
    fn test_retention_bounds_mirror_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trail.jsonl");
        let trail = JsonlCognitiveTrail::open(&path).unwrap().with_retention(1);

        trail.append(TrailEntry::new(Phase::Plan, json!({"runId": "r"})));
        trail.append(TrailEntry::new(Phase::Reflect, json!({"runId": "r"})));
        assert_eq!(trail.history().len(), 1);
        assert_eq!(trail.history_for("r")[0].phase, Phase::Reflect);
        drop(trail);

        assert_eq!(read_lines(&path).len(), 2);
    }
}
