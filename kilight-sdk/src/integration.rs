//! Lifecycle of one configured device
//!
//! [`Integration::setup`] opens the session, runs the handshake, builds the
//! entities and starts polling. [`Integration::unload`] and
//! [`Integration::on_host_stop`] tear things down; the session is
//! disconnected exactly once whichever runs first.
//!
//! Dropping the `setup` future before it resolves closes the session it
//! opened.
//!
//! ```rust,ignore
//! let integration = Integration::setup(&connector, entry, CoordinatorConfig::default()).await?;
//!
//! // Later, when the user renames the entry
//! if integration.needs_reload(&updated_entry) {
//!     let integration = integration.reload(&connector, updated_entry).await?;
//! }
//!
//! integration.unload().await;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kilight_session::{Connector, DeviceSession};
use kilight_state::{Coordinator, CoordinatorConfig};
use tracing::{debug, info, warn};

use crate::config::ConfigEntry;
use crate::context::DeviceContext;
use crate::entity::EntityRegistry;
use crate::SdkError;

/// A set-up device: session, coordinator and entities
pub struct Integration {
    entry: ConfigEntry,
    config: CoordinatorConfig,
    context: Arc<DeviceContext>,
    registry: EntityRegistry,
    disconnected: AtomicBool,
}

impl Integration {
    /// Bring a configured device up
    ///
    /// A device that does not complete the handshake yields
    /// [`SdkError::NotReady`]; no entities are built and the session is
    /// closed again.
    pub async fn setup(
        connector: &dyn Connector,
        entry: ConfigEntry,
        config: CoordinatorConfig,
    ) -> Result<Self, SdkError> {
        entry.data.validate()?;

        let pending = PendingSession::new(connector.open(&entry.data.host, entry.data.port));
        let session = Arc::clone(pending.session());
        let coordinator = Coordinator::new(Arc::clone(&session), config.clone());

        if let Err(err) = coordinator.start_and_wait_ready().await {
            warn!(entry = %entry.entry_id, error = %err, "Device not ready");
            coordinator.shutdown();
            pending.close().await;
            return Err(SdkError::NotReady(err));
        }

        let context = DeviceContext::new(entry.title.clone(), Arc::clone(&session), coordinator.clone());
        let registry = match EntityRegistry::build(Arc::clone(&context)) {
            Ok(registry) => registry,
            Err(err) => {
                coordinator.shutdown();
                pending.close().await;
                return Err(err.into());
            }
        };

        pending.keep();
        coordinator.start_polling();

        info!(
            entry = %entry.entry_id,
            device = %entry.title,
            address = %session.address(),
            hardware_id = %context.identity().hardware_id,
            "KiLight set up"
        );

        Ok(Self {
            entry,
            config,
            context,
            registry,
            disconnected: AtomicBool::new(false),
        })
    }

    pub fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    pub fn context(&self) -> &Arc<DeviceContext> {
        &self.context
    }

    pub fn coordinator(&self) -> &Coordinator {
        self.context.coordinator()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Whether an updated entry requires tearing down and setting up again
    ///
    /// Entity device info carries the title, so a rename reloads.
    pub fn needs_reload(&self, updated: &ConfigEntry) -> bool {
        updated.title != self.context.title()
    }

    /// Unload, then set up again from `entry`
    pub async fn reload(self, connector: &dyn Connector, entry: ConfigEntry) -> Result<Self, SdkError> {
        debug!(entry = %entry.entry_id, title = %entry.title, "Reloading entry");
        let config = self.config.clone();
        self.unload().await;
        Self::setup(connector, entry, config).await
    }

    /// Tear down entities, stop the coordinator and disconnect
    pub async fn unload(&self) {
        self.registry.unload();
        self.context.coordinator().shutdown();
        self.disconnect_once().await;
    }

    /// Host is shutting down; stop polling and close the connection
    ///
    /// Entities stay subscribed until [`Integration::unload`].
    pub async fn on_host_stop(&self) {
        self.context.coordinator().shutdown();
        self.disconnect_once().await;
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    async fn disconnect_once(&self) -> bool {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return false;
        }

        self.context.session().disconnect().await;
        debug!(entry = %self.entry.entry_id, "Session disconnected");
        true
    }
}

/// Session opened by `setup` that is not yet owned by an [`Integration`]
///
/// Dropped while still pending, it disconnects the session on the current
/// runtime.
struct PendingSession {
    session: Arc<dyn DeviceSession>,
    armed: bool,
}

impl PendingSession {
    fn new(session: Arc<dyn DeviceSession>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn session(&self) -> &Arc<dyn DeviceSession> {
        &self.session
    }

    /// Hand the session over; nothing is closed on drop
    fn keep(mut self) {
        self.armed = false;
    }

    async fn close(mut self) {
        self.armed = false;
        self.session.disconnect().await;
    }
}

impl Drop for PendingSession {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let session = Arc::clone(&self.session);
        debug!(address = %session.address(), "Setup abandoned, closing session");
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move { session.disconnect().await });
            }
            Err(_) => warn!(address = %session.address(), "No runtime to close abandoned session"),
        }
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("entry", &self.entry.entry_id)
            .field("context", &self.context)
            .field("registry", &self.registry)
            .finish()
    }
}
