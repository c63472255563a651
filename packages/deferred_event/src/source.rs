//! The contract between the adapter and the event sources it observes.
//!
//! An event source lets code register listeners against event names and later invokes those
//! listeners with a payload each time the corresponding event occurs. The source owns its
//! listener registry; the adapter only adds and removes its own registrations through these
//! traits and never inspects anything else.
//!
//! [`LocalEmitter`][crate::LocalEmitter] and [`Emitter`][crate::Emitter] are ready-made sources.
//! Any other event system can be adapted by implementing the matching trait.

use crate::{EventName, ListenerId};

/// A listener that may only be invoked on the thread that registered it.
pub type LocalListener<P> = Box<dyn Fn(&P)>;

/// A listener that may be invoked from any thread.
pub type Listener<P> = Box<dyn Fn(&P) + Send + Sync>;

/// A single-threaded source of named events.
pub trait LocalEventSource {
    /// The value passed to listeners when an event occurs.
    type Payload;

    /// Registers `listener` to be invoked every time `event` occurs, until removed.
    fn add_listener(&self, event: EventName, listener: LocalListener<Self::Payload>)
    -> ListenerId;

    /// Removes a listener previously registered for `event`.
    ///
    /// Returns `false` if no such listener was registered.
    fn remove_listener(&self, event: &str, id: ListenerId) -> bool;
}

/// A thread-safe source of named events.
pub trait EventSource {
    /// The value passed to listeners when an event occurs.
    type Payload;

    /// Registers `listener` to be invoked every time `event` occurs, until removed.
    fn add_listener(&self, event: EventName, listener: Listener<Self::Payload>) -> ListenerId;

    /// Removes a listener previously registered for `event`.
    ///
    /// Returns `false` if no such listener was registered.
    fn remove_listener(&self, event: &str, id: ListenerId) -> bool;
}
