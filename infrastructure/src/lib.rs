//! Infrastructure layer for pmcro
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer:
//!
//! - [`tools`]: the tool registry and built-in tools
//! - [`rpc`]: JSON-RPC framing, the tool server and dispatcher proxies
//! - [`oracle`]: the HTTP oracle gateway
//! - [`trail`]: the JSONL cognitive trail
//! - [`config`]: configuration file loading

pub mod config;
pub mod oracle;
pub mod rpc;
pub mod tools;
pub mod trail;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, ConfigSource, DispatcherMode, FileConfig};
pub use oracle::OllamaGateway;
pub use rpc::{HttpDispatcher, InProcessDispatcher, ToolServer};
pub use tools::{RegistryError, ToolOptions, ToolRegistry, default_registry};
pub use trail::JsonlCognitiveTrail;
