//! Host-facing lifecycle hooks.
//!
//! The host invokes these in its own threads; the endpoint translates each
//! hook into manager operations and surfaces every error back to the host
//! (a rejected filter becomes an invalid-query status there, a failed
//! enable leaves indications off). Nothing is swallowed.
//!
//! Hook order, as driven by the host: `authorize_filter` and
//! `activate_filter` per subscription, `enable_indications` once delivery
//! should begin, the mirrored calls on the way down, `indication_cleanup`
//! at provider unload.

use tracing::debug;
use tracing::info;

use crate::IndicationManager;
use crate::OperationContext;
use crate::Result;

/// Per-provider adapter owning one [`IndicationManager`].
pub struct ProviderEndpoint {
    manager: IndicationManager,
}

impl ProviderEndpoint {
    /// Provider initialization: wrap a fully assembled manager.
    pub fn new(manager: IndicationManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &IndicationManager {
        &self.manager
    }

    /// Validate a subscriber's filter before activation.
    pub fn authorize_filter(
        &self,
        query: &str,
        namespace: &str,
        user: Option<&str>,
    ) -> Result<()> {
        debug!(
            "authorize_filter in {} for user {:?}: {}",
            namespace, user, query
        );
        self.manager.verify_filter(query)?;
        Ok(())
    }

    /// Whether the host broker should poll on the provider's behalf.
    /// Always `false`: the engine owns its own polling.
    pub fn must_poll(
        &self,
        query: &str,
    ) -> bool {
        debug!("must_poll rejected for: {}", query);
        false
    }

    /// Subscription activated: verify and register the filter.
    pub async fn activate_filter(
        &self,
        query: &str,
        first_activation: bool,
    ) -> Result<()> {
        debug!("activate_filter (first: {}): {}", first_activation, query);
        self.manager.verify_filter(query)?;
        self.manager.add_filter(query).await
    }

    /// Subscription deactivated: unregister the filter.
    pub async fn deactivate_filter(
        &self,
        query: &str,
        last_activation: bool,
    ) -> Result<()> {
        debug!("deactivate_filter (last: {}): {}", last_activation, query);
        self.manager.remove_filter(query).await
    }

    /// Begin generating indications.
    pub async fn enable_indications(
        &self,
        ctx: OperationContext,
    ) -> Result<()> {
        info!("enable_indications in {}", ctx.namespace);
        self.manager.start(ctx).await
    }

    /// Stop generating indications. A no-op when already stopped.
    pub async fn disable_indications(&self) -> Result<()> {
        info!("disable_indications");
        self.manager.stop().await
    }

    /// Provider unload: stop and release everything.
    pub async fn indication_cleanup(&self) -> Result<()> {
        info!("indication_cleanup");
        self.manager.destroy().await
    }
}
