//! The set of entities exposed for one device

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kilight_session::OutputId;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{Capabilities, Entity, EntityKind, EntityUpdate};
use crate::context::DeviceContext;
use crate::error::EntityError;

/// Capacity of the update channel; slow receivers see `Lagged`
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Every entity of one device, built once from its capabilities
pub struct EntityRegistry {
    context: Arc<DeviceContext>,
    capabilities: Capabilities,
    entities: Vec<Arc<Entity>>,
    updates: broadcast::Sender<EntityUpdate>,
    unloaded: AtomicBool,
}

impl EntityRegistry {
    /// Build and subscribe the entities the current snapshot supports
    pub fn build(context: Arc<DeviceContext>) -> Result<Self, EntityError> {
        let capabilities = Capabilities::from_state(&context.session.state());
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let entities = capabilities
            .entity_kinds()
            .into_iter()
            .map(|kind| Entity::new(Arc::clone(&context), kind))
            .collect::<Result<Vec<_>, _>>()?;

        for entity in &entities {
            entity.subscribe(updates.clone());
        }

        info!(
            device = %context.title,
            entities = entities.len(),
            output_b = capabilities.output_b,
            "Entity registry built"
        );

        Ok(Self {
            context,
            capabilities,
            entities,
            updates,
            unloaded: AtomicBool::new(false),
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn context(&self) -> &Arc<DeviceContext> {
        &self.context
    }

    /// Entities in construction order
    pub fn entities(&self) -> &[Arc<Entity>] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, unique_id: &str) -> Option<&Arc<Entity>> {
        self.entities.iter().find(|entity| entity.unique_id() == unique_id)
    }

    pub fn find(&self, kind: EntityKind) -> Option<&Arc<Entity>> {
        self.entities.iter().find(|entity| entity.kind() == kind)
    }

    pub fn light(&self, output: OutputId) -> Option<&Arc<Entity>> {
        self.find(EntityKind::Light(output))
    }

    pub fn lights(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities
            .iter()
            .filter(|entity| matches!(entity.kind(), EntityKind::Light(_)))
    }

    /// Receive an [`EntityUpdate`] after every entity recompute
    pub fn subscribe(&self) -> broadcast::Receiver<EntityUpdate> {
        self.updates.subscribe()
    }

    /// Cancel every entity subscription
    ///
    /// Returns how many subscriptions were removed; a second call removes none.
    pub fn unload(&self) -> usize {
        if self.unloaded.swap(true, Ordering::SeqCst) {
            return 0;
        }

        let removed = self
            .entities
            .iter()
            .filter(|entity| entity.unsubscribe())
            .count();

        debug!(device = %self.context.title, removed, "Entity registry unloaded");
        removed
    }

    pub fn is_unloaded(&self) -> bool {
        self.unloaded.load(Ordering::SeqCst)
    }
}

impl Drop for EntityRegistry {
    fn drop(&mut self) {
        self.unload();
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("device", &self.context.title)
            .field("capabilities", &self.capabilities)
            .field("entities", &self.entities.len())
            .finish()
    }
}
