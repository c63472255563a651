use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{trace, warn};

use crate::emitter::Registry;
use crate::{ERR_POISONED_LOCK, EmitterBuilder, EventName, EventSource, Listener, ListenerId};

type SharedListener<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// A thread-safe event emitter that delivers payloads of type `P` to named-event listeners.
///
/// Listeners are invoked on whichever thread calls [`emit()`][Self::emit]. See the
/// [module-level documentation][crate::emitter] for the emission semantics.
pub struct Emitter<P> {
    name: Cow<'static, str>,
    next_id: AtomicU64,
    registry: Mutex<Registry<SharedListener<P>>>,
}

impl<P> Emitter<P> {
    /// Creates an emitter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building an emitter with a custom configuration.
    #[must_use]
    pub fn builder() -> EmitterBuilder<Self> {
        EmitterBuilder::new()
    }

    /// The diagnostic name of the emitter.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `listener` to be invoked every time `event` is emitted, until removed.
    pub fn on(
        &self,
        event: impl Into<EventName>,
        listener: impl Fn(&P) + Send + Sync + 'static,
    ) -> ListenerId {
        self.register(event.into(), Arc::new(listener))
    }

    /// Removes a listener previously registered for `event`.
    ///
    /// Returns `false` if no such listener is registered.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let removed = self.registry().remove(event, id);

        trace!(emitter = %self.name, event, listener = %id, removed, "removing listener");

        removed
    }

    /// Invokes every listener registered for `event` with `payload`, in registration order,
    /// on the current thread.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &str, payload: &P) -> usize {
        // The lock must be released before any listener runs, as listeners may call back
        // into the emitter.
        let snapshot = self.registry().snapshot(event);

        trace!(emitter = %self.name, event, listeners = snapshot.len(), "emitting event");

        for listener in &snapshot {
            listener(payload);
        }

        snapshot.len()
    }

    /// The number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry().count(event)
    }

    /// The names of all events that have at least one listener, in sorted order.
    #[must_use]
    pub fn event_names(&self) -> Vec<EventName> {
        self.registry().event_names()
    }

    /// Removes all listeners registered for `event`, returning how many were removed.
    pub fn remove_all_listeners(&self, event: &str) -> usize {
        let removed = self.registry().remove_all(event);

        trace!(emitter = %self.name, event, removed, "removing all listeners");

        removed
    }

    fn registry(&self) -> MutexGuard<'_, Registry<SharedListener<P>>> {
        self.registry.lock().expect(ERR_POISONED_LOCK)
    }

    fn register(&self, event: EventName, listener: SharedListener<P>) -> ListenerId {
        // Only uniqueness matters, there is no ordering relationship with other data.
        let id = ListenerId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));

        let added = self.registry().add(event.clone(), id, listener);

        trace!(
            emitter = %self.name,
            event = %event,
            listener = %id,
            count = added.count,
            "registered listener"
        );

        if let Some(max_listeners) = added.exceeded_threshold {
            warn!(
                emitter = %self.name,
                event = %event,
                count = added.count,
                max_listeners,
                "possible listener leak: more listeners registered for one event than expected"
            );
        }

        id
    }
}

impl<P> EmitterBuilder<Emitter<P>> {
    /// Builds the emitter.
    #[must_use]
    pub fn build(self) -> Emitter<P> {
        Emitter {
            name: self.name,
            next_id: AtomicU64::new(0),
            registry: Mutex::new(Registry::new(self.max_listeners)),
        }
    }
}

impl<P> Default for Emitter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> EventSource for Emitter<P> {
    type Payload = P;

    fn add_listener(&self, event: EventName, listener: Listener<P>) -> ListenerId {
        self.register(event, Arc::from(listener))
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        self.off(event, id)
    }
}

impl<P> fmt::Debug for Emitter<P> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("name", &self.name)
            .field("event_names", &self.event_names())
            .finish_non_exhaustive()
    }
}
