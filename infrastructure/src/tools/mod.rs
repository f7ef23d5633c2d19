//! Tool implementations and the registry that routes to them
//!
//! Tools are registered from an explicit list at startup:
//!
//! - `builtin`: `echo`, `wait`, `current_time` - always available
//! - `page`: `page_open`, `page_extract`, `page_reset` - `web-tools` feature
//!
//! The fallback plan's `manual_intervention` tool is deliberately absent.

pub mod builtin;
#[cfg(feature = "web-tools")]
pub mod page;
pub mod resource;

mod registry;

pub use builtin::{CurrentTimeTool, EchoTool, WaitTool};
pub use registry::{RegistryError, ToolRegistry};
pub use resource::{ExclusiveResource, ResourceFactory, ResourceGuard};

/// Which optional tool groups to register.
#[derive(Debug, Clone)]
pub struct ToolOptions {
    /// Register the page-session tools (needs the `web-tools` feature)
    pub web: bool,
    /// HTTP timeout for page fetches
    pub web_timeout: std::time::Duration,
    /// Upper bound for the `wait` tool
    pub max_wait_millis: u64,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            web: cfg!(feature = "web-tools"),
            web_timeout: std::time::Duration::from_secs(30),
            max_wait_millis: 10_000,
        }
    }
}

/// Build the registry with every tool enabled by `options`.
pub fn default_registry(options: &ToolOptions) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool)?;
    registry.register(WaitTool::default().with_max_millis(options.max_wait_millis))?;
    registry.register(CurrentTimeTool)?;

    if options.web {
        register_page_tools(&mut registry, options)?;
    }

    Ok(registry)
}

#[cfg(feature = "web-tools")]
fn register_page_tools(
    registry: &mut ToolRegistry,
    options: &ToolOptions,
) -> Result<(), RegistryError> {
    let factory = page::PageSessionFactory::new(options.web_timeout)
        .map_err(|e| RegistryError::Setup(e.to_string()))?;
    let session = std::sync::Arc::new(ExclusiveResource::new(factory));
    for tool in page::page_tools(session) {
        registry.register_arc(tool)?;
    }
    Ok(())
}

#[cfg(not(feature = "web-tools"))]
fn register_page_tools(
    _registry: &mut ToolRegistry,
    _options: &ToolOptions,
) -> Result<(), RegistryError> {
    tracing::warn!("Page tools requested but the web-tools feature is not compiled in");
    Ok(())
}

/// Registry used across this crate's tests: `echo`, `mirror`, `explode`.
#[cfg(test)]
pub(crate) fn registry_for_tests() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool).unwrap();
    registry.register(registry::test_tools::MirrorTool).unwrap();
    registry.register(registry::test_tools::FailingTool).unwrap();
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_without_web() {
        let options = ToolOptions {
            web: false,
            ..Default::default()
        };
        let registry = default_registry(&options).unwrap();
        assert_eq!(registry.names(), vec!["echo", "wait", "current_time"]);
        assert!(!registry.names().contains(&pmcro_domain::MANUAL_INTERVENTION_TOOL));
    }

    #[cfg(feature = "web-tools")]
    #[test]
    fn test_default_registry_with_web() {
        let registry = default_registry(&ToolOptions::default()).unwrap();
        assert!(registry.names().contains(&"page_open"));
        assert!(registry.names().contains(&"page_reset"));
        assert_eq!(registry.len(), 6);
    }
}
