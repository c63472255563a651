use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::emitter::Registry;
use crate::{EmitterBuilder, EventName, ListenerId, LocalEventSource, LocalListener};

type SharedListener<P> = Rc<dyn Fn(&P)>;

/// A single-threaded event emitter that delivers payloads of type `P` to named-event listeners.
///
/// See the [module-level documentation][crate::emitter] for the emission semantics.
///
/// For an emitter that can be shared between threads, see [`Emitter`][crate::Emitter].
pub struct LocalEmitter<P> {
    name: Cow<'static, str>,
    next_id: Cell<u64>,
    registry: RefCell<Registry<SharedListener<P>>>,
}

impl<P> LocalEmitter<P> {
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
    pub fn on(&self, event: impl Into<EventName>, listener: impl Fn(&P) + 'static) -> ListenerId {
        self.register(event.into(), Rc::new(listener))
    }

    /// Removes a listener previously registered for `event`.
    ///
    /// Returns `false` if no such listener is registered.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let removed = self.registry.borrow_mut().remove(event, id);

        trace!(emitter = %self.name, event, listener = %id, removed, "removing listener");

        removed
    }

    /// Invokes every listener registered for `event` with `payload`, in registration order.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &str, payload: &P) -> usize {
        // The registry borrow must end before any listener runs, as listeners may call back
        // into the emitter.
        let snapshot = self.registry.borrow().snapshot(event);

        trace!(emitter = %self.name, event, listeners = snapshot.len(), "emitting event");

        for listener in &snapshot {
            listener(payload);
        }

        snapshot.len()
    }

    /// The number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry.borrow().count(event)
    }

    /// The names of all events that have at least one listener, in sorted order.
    #[must_use]
    pub fn event_names(&self) -> Vec<EventName> {
        self.registry.borrow().event_names()
    }

    /// Removes all listeners registered for `event`, returning how many were removed.
    pub fn remove_all_listeners(&self, event: &str) -> usize {
        let removed = self.registry.borrow_mut().remove_all(event);

        trace!(emitter = %self.name, event, removed, "removing all listeners");

        removed
    }

    fn register(&self, event: EventName, listener: SharedListener<P>) -> ListenerId {
        let id = ListenerId::from_raw(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));

        let added = self
            .registry
            .borrow_mut()
            .add(event.clone(), id, listener);

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

impl<P> EmitterBuilder<LocalEmitter<P>> {
    /// Builds the emitter.
    #[must_use]
    pub fn build(self) -> LocalEmitter<P> {
        LocalEmitter {
            name: self.name,
            next_id: Cell::new(0),
            registry: RefCell::new(Registry::new(self.max_listeners)),
        }
    }
}

impl<P> Default for LocalEmitter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> LocalEventSource for LocalEmitter<P> {
    type Payload = P;

    fn add_listener(&self, event: EventName, listener: LocalListener<P>) -> ListenerId {
        self.register(event, Rc::from(listener))
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        self.off(event, id)
    }
}

impl<P> fmt::Debug for LocalEmitter<P> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEmitter")
            .field("name", &self.name)
            .field("event_names", &self.event_names())
            .finish_non_exhaustive()
    }
}
