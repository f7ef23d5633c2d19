//! Configuration file loading for pmcro
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `PMCRO_`-prefixed environment variables (`__` separates section and key)
//! 2. `--config <path>` specified file
//! 3. Project root: `./pmcro.toml` or `./.pmcro.toml`
//! 4. Global: `$XDG_CONFIG_HOME/pmcro/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigError, DispatcherMode, FileConfig, FileDispatcherConfig, FileOracleConfig,
    FileToolsConfig, FileTrailConfig,
};
pub use loader::{ConfigLoader, ConfigSource};
