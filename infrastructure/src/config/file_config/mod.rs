//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section has defaults, so an empty file is a valid configuration.

mod dispatcher;
mod oracle;
mod tools;
mod trail;

pub use dispatcher::{DispatcherMode, FileDispatcherConfig};
pub use oracle::FileOracleConfig;
pub use tools::FileToolsConfig;
pub use trail::FileTrailConfig;

use pmcro_application::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("trail.retention cannot be 0")]
    ZeroRetention,

    #[error("dispatcher.url is required when dispatcher.mode = \"remote\"")]
    MissingRemoteUrl,

    #[error("oracle.model cannot be empty")]
    EmptyModelName,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub oracle: FileOracleConfig,
    pub dispatcher: FileDispatcherConfig,
    pub trail: FileTrailConfig,
    pub tools: FileToolsConfig,
}

impl FileConfig {
    /// Reject configurations the runtime cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle.model.trim().is_empty() {
            return Err(ConfigError::EmptyModelName);
        }

        let timeouts = [
            ("oracle.planning_timeout_secs", self.oracle.planning_timeout_secs),
            ("oracle.validation_timeout_secs", self.oracle.validation_timeout_secs),
            ("dispatcher.call_timeout_secs", self.dispatcher.call_timeout_secs),
            ("tools.web_timeout_secs", self.tools.web_timeout_secs),
        ];
        if let Some((field, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::ZeroTimeout(*field));
        }

        if self.trail.retention == Some(0) {
            return Err(ConfigError::ZeroRetention);
        }

        if self.dispatcher.mode == DispatcherMode::Remote
            && self
                .dispatcher
                .url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            return Err(ConfigError::MissingRemoteUrl);
        }

        Ok(())
    }

    /// Deadlines for the orchestration loop.
    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_planning_timeout(Some(Duration::from_secs(self.oracle.planning_timeout_secs)))
            .with_validation_timeout(Some(Duration::from_secs(
                self.oracle.validation_timeout_secs,
            )))
            .with_tool_call_timeout(Some(Duration::from_secs(
                self.dispatcher.call_timeout_secs,
            )))
    }

    /// Client-level HTTP timeout for the oracle: the longer phase deadline.
    pub fn oracle_request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.oracle
                .planning_timeout_secs
                .max(self.oracle.validation_timeout_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[oracle]
base_url = "http://oracle:11434"
model = "qwen2.5"
planning_timeout_secs = 60
temperature = 0.1

[dispatcher]
mode = "remote"
url = "http://tools:8808/rpc"
call_timeout_secs = 15

[trail]
path = "/var/log/pmcro/trail.jsonl"
retention = 500

[tools]
web = false
max_wait_millis = 2000
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.oracle.model, "qwen2.5");
        assert_eq!(config.oracle.planning_timeout_secs, 60);
        assert_eq!(config.oracle.validation_timeout_secs, 300);
        assert_eq!(config.oracle.temperature, Some(0.1));
        assert_eq!(config.dispatcher.mode, DispatcherMode::Remote);
        assert_eq!(config.dispatcher.url.as_deref(), Some("http://tools:8808/rpc"));
        assert_eq!(config.trail.retention, Some(500));
        assert!(!config.tools.web);
        assert_eq!(config.tools.to_options().max_wait_millis, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.oracle.base_url, "http://localhost:11434");
        assert_eq!(config.oracle.model, "llama3.1");
        assert_eq!(config.dispatcher.mode, DispatcherMode::Local);
        assert!(config.trail.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_execution_params_from_config() {
        let mut config = FileConfig::default();
        config.oracle.planning_timeout_secs = 10;
        config.dispatcher.call_timeout_secs = 3;

        let params = config.execution_params();
        assert_eq!(params.planning_timeout, Some(Duration::from_secs(10)));
        assert_eq!(params.validation_timeout, Some(Duration::from_secs(300)));
        assert_eq!(params.tool_call_timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.oracle_request_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = FileConfig::default();
        config.dispatcher.call_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroTimeout("dispatcher.call_timeout_secs")
        ));
    }

    #[test]
    fn test_validate_rejects_zero_retention() {
        let mut config = FileConfig::default();
        config.trail.retention = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroRetention)));

        config.trail.retention = Some(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_remote_requires_url() {
        let mut config = FileConfig::default();
        config.dispatcher.mode = DispatcherMode::Remote;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRemoteUrl)
        ));

        config.dispatcher.url = Some("http://tools/rpc".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = FileConfig::default();
        config.oracle.model = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyModelName)));
    }

    #[test]
    fn test_unknown_dispatcher_mode_rejected() {
        let result = toml::from_str::<FileConfig>("[dispatcher]\nmode = \"carrier-pigeon\"\n");
        assert!(result.is_err());
    }
}
