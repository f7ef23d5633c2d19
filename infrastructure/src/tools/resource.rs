//! Exclusive resource handle.
//!
//! Some tools drive a single external resource (one browser-like page
//! session, one connection). [`ExclusiveResource`] owns that resource and
//! hands out at most one guard at a time, so every operation against it is
//! serialized. The resource is created lazily by a [`ResourceFactory`].
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`acquire`](ExclusiveResource::acquire) | wait for exclusivity, create the resource if absent |
//! | [`reset`](ExclusiveResource::reset) | drop the current resource (if any) and create a fresh one |
//! | [`release`](ExclusiveResource::release) | drop the resource; the next `acquire` recreates it |

use async_trait::async_trait;
use pmcro_domain::ToolError;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::debug;

/// Creates instances of an exclusive resource.
#[async_trait]
pub trait ResourceFactory: Send + Sync + 'static {
    type Resource: Send + 'static;

    /// Short label used in logs.
    fn label(&self) -> &str;

    async fn create(&self) -> Result<Self::Resource, ToolError>;
}

/// Exclusive guard over the live resource.
pub type ResourceGuard<'a, R> = MappedMutexGuard<'a, R>;

/// A lazily created resource with at most one user at a time.
pub struct ExclusiveResource<F: ResourceFactory> {
    factory: F,
    slot: Mutex<Option<F::Resource>>,
}

impl<F: ResourceFactory> ExclusiveResource<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            slot: Mutex::new(None),
        }
    }

    /// Wait for exclusive access, creating the resource on first use.
    pub async fn acquire(&self) -> Result<ResourceGuard<'_, F::Resource>, ToolError> {
        let mut slot = self.slot.lock().await;
        if slot.is_none() {
            debug!(resource = self.factory.label(), "Creating resource");
            *slot = Some(self.factory.create().await?);
        }
        MutexGuard::try_map(slot, Option::as_mut)
            .map_err(|_| ToolError::execution_failed("Resource is unavailable"))
    }

    /// Discard the current resource and create a fresh one.
    ///
    /// Calling this repeatedly leaves exactly one fresh resource.
    pub async fn reset(&self) -> Result<(), ToolError> {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            debug!(resource = self.factory.label(), "Discarded resource");
        }
        *slot = Some(self.factory.create().await?);
        Ok(())
    }

    /// Drop the resource without recreating it.
    pub async fn release(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            debug!(resource = self.factory.label(), "Released resource");
        }
    }

    pub async fn is_acquired(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}
