//! Tools configuration from TOML (`[tools]` section)

use crate::tools::ToolOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw tools configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Register the page-session tools
    pub web: bool,
    /// HTTP timeout for `page_open`
    pub web_timeout_secs: u64,
    /// Upper bound accepted by `wait`
    pub max_wait_millis: u64,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        let options = ToolOptions::default();
        Self {
            web: options.web,
            web_timeout_secs: options.web_timeout.as_secs(),
            max_wait_millis: options.max_wait_millis,
        }
    }
}

impl FileToolsConfig {
    pub fn to_options(&self) -> ToolOptions {
        ToolOptions {
            web: self.web,
            web_timeout: Duration::from_secs(self.web_timeout_secs),
            max_wait_millis: self.max_wait_millis,
        }
    }
}
