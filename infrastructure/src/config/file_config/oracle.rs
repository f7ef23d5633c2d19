//! Oracle configuration from TOML (`[oracle]` section)

use crate::oracle::ollama::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};

/// Raw oracle configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOracleConfig {
    /// Base URL of the chat endpoint
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    /// Deadline for the Plan phase round-trip
    pub planning_timeout_secs: u64,
    /// Deadline for the Check phase round-trip
    pub validation_timeout_secs: u64,
    /// Sampling temperature; backend default when unset
    pub temperature: Option<f32>,
}

impl Default for FileOracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            planning_timeout_secs: 300,
            validation_timeout_secs: 300,
            temperature: None,
        }
    }
}
