//! Dispatcher configuration from TOML (`[dispatcher]` section)
//!
//! ```toml
//! [dispatcher]
//! mode = "remote"
//! url = "http://127.0.0.1:8808/rpc"
//! call_timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};

/// Where tool calls are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatcherMode {
    /// Registry in this process
    #[default]
    Local,
    /// JSON-RPC over HTTP
    Remote,
}

impl DispatcherMode {
    pub fn as_str(&self) -> &str {
        match self {
            DispatcherMode::Local => "local",
            DispatcherMode::Remote => "remote",
        }
    }
}

impl std::fmt::Display for DispatcherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw dispatcher configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatcherConfig {
    pub mode: DispatcherMode,
    /// Endpoint for `remote` mode
    pub url: Option<String>,
    /// Deadline for each tool call
    pub call_timeout_secs: u64,
}

impl Default for FileDispatcherConfig {
    fn default() -> Self {
        Self {
            mode: DispatcherMode::Local,
            url: None,
            call_timeout_secs: 120,
        }
    }
}
