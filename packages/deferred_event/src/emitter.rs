//! Ready-made event sources.
//!
//! [`LocalEmitter`] is for single-threaded use, [`Emitter`] may be shared between threads.
//! Both keep a per-event-name list of listeners and invoke them in registration order when the
//! event is emitted.
//!
//! Emission operates on a snapshot of the listener list:
//!
//! * A listener removed during emission is still called in that round.
//! * A listener added during emission is not called until the next emission.
//!
//! No internal borrow or lock is held while listeners run, so listeners may freely register or
//! remove listeners (including themselves) on the emitter that is invoking them.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use deferred_event::LocalEmitter;
//!
//! let emitter = LocalEmitter::<u32>::new();
//! let total = Rc::new(Cell::new(0));
//!
//! let id = emitter.on("tick", {
//!     let total = Rc::clone(&total);
//!     move |value: &u32| total.set(total.get() + value)
//! });
//!
//! assert_eq!(emitter.emit("tick", &5), 1);
//! assert!(emitter.off("tick", id));
//! assert_eq!(emitter.emit("tick", &5), 0);
//!
//! assert_eq!(total.get(), 5);
//! ```

mod builder;
mod local;
mod sync;

pub use builder::*;
pub use local::*;
pub use sync::*;

use foldhash::{HashMap, HashMapExt};

use crate::{EventName, ListenerId};

/// Per-event-name threshold above which a possible listener leak is reported.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Diagnostic name used in log fields when none is configured.
pub const DEFAULT_EMITTER_NAME: &str = "emitter";

/// The listener registry shared by both emitter variants.
///
/// `L` is the cheaply cloneable listener handle used for taking emission snapshots.
#[derive(Debug)]
struct Registry<L> {
    by_event: HashMap<EventName, Listeners<L>>,

    /// `None` if the leak warning is disabled.
    max_listeners: Option<usize>,
}

#[derive(Debug)]
struct Listeners<L> {
    entries: Vec<(ListenerId, L)>,

    /// Whether the leak threshold has been reported for this event name.
    /// Each event name is reported at most once per emitter.
    leak_reported: bool,
}

/// What happened when a listener was added to the registry.
#[derive(Debug)]
struct Added {
    /// Number of listeners registered for the event, including the new one.
    count: usize,

    /// Set if this registration pushed the event past the leak threshold for the first time.
    exceeded_threshold: Option<usize>,
}

impl<L> Registry<L>
where
    L: Clone,
{
    fn new(max_listeners: Option<usize>) -> Self {
        Self {
            by_event: HashMap::new(),
            max_listeners,
        }
    }

    fn add(&mut self, event: EventName, id: ListenerId, listener: L) -> Added {
        let listeners = self.by_event.entry(event).or_insert_with(|| Listeners {
            entries: Vec::new(),
            leak_reported: false,
        });

        listeners.entries.push((id, listener));
        let count = listeners.entries.len();

        let exceeded_threshold = match self.max_listeners {
            Some(max) if count > max && !listeners.leak_reported => {
                listeners.leak_reported = true;
                Some(max)
            }
            _ => None,
        };

        Added {
            count,
            exceeded_threshold,
        }
    }

    fn remove(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(listeners) = self.by_event.get_mut(event) else {
            return false;
        };

        let Some(index) = listeners
            .entries
            .iter()
            .position(|(candidate, _)| *candidate == id)
        else {
            return false;
        };

        // Order matters because listeners are invoked in registration order.
        listeners.entries.remove(index);

        if listeners.entries.is_empty() {
            self.by_event.remove(event);
        }

        true
    }

    fn remove_all(&mut self, event: &str) -> usize {
        self.by_event
            .remove(event)
            .map_or(0, |listeners| listeners.entries.len())
    }

    fn snapshot(&self, event: &str) -> Vec<L> {
        self.by_event.get(event).map_or_else(Vec::new, |listeners| {
            listeners
                .entries
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect()
        })
    }

    fn count(&self, event: &str) -> usize {
        self.by_event
            .get(event)
            .map_or(0, |listeners| listeners.entries.len())
    }

    fn event_names(&self) -> Vec<EventName> {
        let mut names = self.by_event.keys().cloned().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}
