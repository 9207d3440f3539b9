//! Update subscriptions with explicit cancellation
//!
//! A [`Subscribers`] registry holds no-payload callbacks. Every registration
//! returns a [`CancelHandle`]; cancelling it removes exactly that registration
//! and further cancels are no-ops. Callbacks run in registration order.
//!
//! ```rust,ignore
//! let subscribers = Subscribers::new();
//! let handle = subscribers.register(|| println!("state changed"));
//!
//! subscribers.notify(); // prints once
//!
//! handle.cancel();
//! handle.cancel(); // no-op
//! subscribers.notify(); // prints nothing
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Callback invoked on every state change; reads state through its own handle
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Identifier of one registration within a [`Subscribers`] registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

/// Ordered set of state-change callbacks
#[derive(Clone, Default)]
pub struct Subscribers {
    registry: Arc<Mutex<Registry>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, returning the handle that removes it again
    pub fn register<F>(&self, callback: F) -> CancelHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(callback)));

        tracing::trace!(subscription = id.0, total = registry.entries.len(), "Subscription registered");

        CancelHandle {
            id,
            registry: Arc::downgrade(&self.registry),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Invoke every registered callback in registration order
    ///
    /// Callbacks run outside the registry lock, so a callback may cancel its
    /// own or any other registration. Returns how many callbacks ran.
    pub fn notify(&self) -> usize {
        let callbacks: Vec<Callback> = self
            .registry
            .lock()
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in &callbacks {
            callback();
        }

        callbacks.len()
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration at once
    pub fn clear(&self) {
        self.registry.lock().entries.clear();
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers").field("len", &self.len()).finish()
    }
}

fn remove(registry: &Mutex<Registry>, id: SubscriptionId) -> bool {
    let mut registry = registry.lock();
    let before = registry.entries.len();
    registry.entries.retain(|(entry_id, _)| *entry_id != id);
    registry.entries.len() != before
}

/// Handle that removes one registration from a [`Subscribers`] registry
///
/// Dropping the handle does *not* cancel the registration; call
/// [`CancelHandle::cancel`] or wrap it with [`CancelHandle::into_guard`].
pub struct CancelHandle {
    id: SubscriptionId,
    registry: Weak<Mutex<Registry>>,
    cancelled: AtomicBool,
}

impl CancelHandle {
    /// Remove the registration
    ///
    /// Returns `true` only for the call that actually removed it.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }

        match self.registry.upgrade() {
            Some(registry) => {
                let removed = remove(&registry, self.id);
                tracing::trace!(subscription = self.id.0, removed, "Subscription cancelled");
                removed
            }
            None => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Turn this handle into a guard that cancels on drop
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard { handle: self }
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Scoped registration, cancelled when the guard goes out of scope
#[derive(Debug)]
pub struct SubscriptionGuard {
    handle: CancelHandle,
}

impl SubscriptionGuard {
    pub fn handle(&self) -> &CancelHandle {
        &self.handle
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}
