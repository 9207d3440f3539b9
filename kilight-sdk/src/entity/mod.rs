//! Entities exposed for a KiLight
//!
//! One [`Entity`] type covers every light and sensor; its [`EntityKind`]
//! supplies the metadata and the value projection. Entities listen to the
//! coordinator and re-read the session snapshot on every broadcast, so the
//! displayed value is never older than the last notification.
//!
//! ```rust,ignore
//! let registry = EntityRegistry::build(context)?;
//! let mut updates = registry.subscribe();
//!
//! let light = registry.light(OutputId::OutputA).unwrap();
//! light.execute(LightIntent::set_brightness(128)).await?;
//!
//! while let Ok(update) = updates.recv().await {
//!     println!("{} -> {:?}", update.unique_id, update.value);
//! }
//! ```

mod capabilities;
mod kind;
mod registry;

pub use capabilities::Capabilities;
pub use kind::{
    ColorMode, EntityKind, EntityValue, LightValue, Platform, SensorLocation,
    SUPPORTED_COLOR_MODES,
};
pub use registry::EntityRegistry;

use std::sync::Arc;

use kilight_session::{CancelHandle, MAX_COLOR_TEMP, MIN_COLOR_TEMP};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

use crate::command::{self, LightIntent};
use crate::context::{DeviceContext, DeviceInfo};
use crate::error::EntityError;
use crate::SdkError;

/// Emitted after an entity recomputed its value, changed or not
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate {
    pub unique_id: String,
    pub value: Option<EntityValue>,
}

/// A light or sensor bound to one device
pub struct Entity {
    kind: EntityKind,
    unique_id: String,
    name: String,
    device_info: DeviceInfo,
    context: Arc<DeviceContext>,
    value: RwLock<Option<EntityValue>>,
    color_mode: RwLock<ColorMode>,
    subscription: Mutex<Option<CancelHandle>>,
}

impl Entity {
    /// Build an entity and compute its initial value
    ///
    /// Fails when the current snapshot has no output or sensor for `kind`.
    pub fn new(context: Arc<DeviceContext>, kind: EntityKind) -> Result<Arc<Self>, EntityError> {
        let state = context.session.state();
        kind.validate(&state)?;

        Ok(Arc::new(Self {
            unique_id: format!("{}{}", context.identity.hardware_id, kind.unique_id_suffix()),
            name: kind.name(),
            device_info: context.device_info(),
            value: RwLock::new(kind.project(&state)),
            color_mode: RwLock::new(ColorMode::Rgbww),
            subscription: Mutex::new(None),
            kind,
            context,
        }))
    }

    /// Start following coordinator broadcasts
    ///
    /// Each broadcast recomputes the value and sends an [`EntityUpdate`].
    /// Subscribing again replaces the previous subscription.
    pub(crate) fn subscribe(self: &Arc<Self>, updates: broadcast::Sender<EntityUpdate>) {
        let entity = Arc::downgrade(self);
        let handle = self.context.coordinator.add_listener(move || {
            let Some(entity) = entity.upgrade() else {
                return;
            };
            let value = entity.recompute();
            // No receivers is fine
            let _ = updates.send(EntityUpdate {
                unique_id: entity.unique_id.clone(),
                value,
            });
        });

        if let Some(previous) = self.subscription.lock().replace(handle) {
            previous.cancel();
        }
    }

    /// Stop following broadcasts; returns `true` if a subscription was removed
    pub fn unsubscribe(&self) -> bool {
        self.subscription
            .lock()
            .take()
            .is_some_and(|handle| handle.cancel())
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Re-read the snapshot and update the displayed value
    ///
    /// A snapshot without a value for this entity leaves the previous one.
    pub fn recompute(&self) -> Option<EntityValue> {
        let state = self.context.session.state();
        let mut value = self.value.write();
        if let Some(projected) = self.kind.project(&state) {
            *value = Some(projected);
        }

        debug!(entity = %self.unique_id, value = ?*value, "Entity recomputed");
        *value
    }

    /// Displayed value
    pub fn value(&self) -> Option<EntityValue> {
        *self.value.read()
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    pub fn platform(&self) -> Platform {
        self.kind.platform()
    }

    // ========================================================================
    // Lights
    // ========================================================================

    /// Color mode set by the last successful command
    pub fn color_mode(&self) -> ColorMode {
        *self.color_mode.read()
    }

    pub fn supported_color_modes(&self) -> &'static [ColorMode] {
        &SUPPORTED_COLOR_MODES
    }

    pub fn min_color_temp_kelvin(&self) -> u16 {
        MIN_COLOR_TEMP
    }

    pub fn max_color_temp_kelvin(&self) -> u16 {
        MAX_COLOR_TEMP
    }

    /// Send a light command to this entity's output
    ///
    /// Waits for the device to accept the write. The displayed value is left
    /// alone until the device reports its new state.
    pub async fn execute(&self, intent: LightIntent) -> Result<(), SdkError> {
        let output = self
            .kind
            .light_output()
            .ok_or_else(|| EntityError::NotControllable(self.unique_id.clone()))?;

        if let Some(mode) = command::execute(&self.context, output, &intent).await? {
            *self.color_mode.write() = mode;
        }
        Ok(())
    }

    pub async fn turn_on(&self) -> Result<(), SdkError> {
        self.execute(LightIntent::turn_on()).await
    }

    pub async fn turn_off(&self) -> Result<(), SdkError> {
        self.execute(LightIntent::TurnOff).await
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("unique_id", &self.unique_id)
            .field("kind", &self.kind)
            .field("value", &self.value())
            .field("device", &self.context.session.name())
            .finish()
    }
}
