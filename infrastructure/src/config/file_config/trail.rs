//! Cognitive trail configuration from TOML (`[trail]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw trail configuration from TOML
///
/// Without `path` the trail is kept in memory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTrailConfig {
    /// JSONL file receiving one line per entry
    pub path: Option<PathBuf>,
    /// Keep at most this many entries in memory
    pub retention: Option<usize>,
}
