//! Awaiting the first occurrence of an event through the public API only,
//! driven by a single-threaded run-loop.

use std::cell::{Cell, RefCell};
use std::pin::pin;
use std::rc::Rc;
use std::task::Context;

use deferred_event::{
    EventName, ListenerId, LocalEmitter, LocalEventSource, LocalListener, once_local,
    once_local_scoped,
};
use futures::executor::LocalPool;
use futures::task::{LocalSpawnExt, noop_waker_ref};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Target {
    src: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LoadEvent {
    target: Target,
}

fn load_event(src: &str) -> LoadEvent {
    LoadEvent {
        target: Target {
            src: src.to_string(),
        },
    }
}

#[test]
fn load_event_resolves_to_exact_payload() {
    let image = LocalEmitter::<LoadEvent>::new();
    let mut pool = LocalPool::new();

    let loaded = once_local(&image, "load");
    image.emit("load", &load_event("a.png"));

    assert_eq!(pool.run_until(loaded), load_event("a.png"));
}

#[test]
fn second_occurrence_does_not_change_result() {
    let image = LocalEmitter::<LoadEvent>::new();
    let mut pool = LocalPool::new();

    let loaded = once_local(&image, "load");
    image.emit("load", &load_event("a.png"));
    image.emit("load", &load_event("b.png"));

    assert_eq!(loaded.peek(), Some(load_event("a.png")));
    assert_eq!(pool.run_until(loaded), load_event("a.png"));
}

#[test]
fn never_fired_event_stays_pending() {
    let image = Rc::new(LocalEmitter::<LoadEvent>::new());
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let resolved = Rc::new(RefCell::new(None));

    let loaded = once_local(&*image, "load");

    spawner
        .spawn_local({
            let resolved = Rc::clone(&resolved);
            async move {
                *resolved.borrow_mut() = Some(loaded.await);
            }
        })
        .unwrap();

    // Unrelated activity on the same run-loop, including other events on the same source.
    for round in 0..50 {
        let image = Rc::clone(&image);
        spawner
            .spawn_local(async move {
                image.emit("error", &load_event(&format!("{round}.png")));
            })
            .unwrap();

        pool.run_until_stalled();
    }

    assert!(resolved.borrow().is_none());
}

#[test]
fn awaiting_before_trigger_does_not_deadlock() {
    let image = Rc::new(LocalEmitter::<LoadEvent>::new());
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let order = Rc::new(RefCell::new(Vec::new()));

    let loaded = once_local(&*image, "load");

    spawner
        .spawn_local({
            let order = Rc::clone(&order);
            async move {
                order.borrow_mut().push("waiting".to_string());
                let event = loaded.await;
                order
                    .borrow_mut()
                    .push(format!("resumed with {}", event.target.src));
            }
        })
        .unwrap();

    spawner
        .spawn_local({
            let image = Rc::clone(&image);
            let order = Rc::clone(&order);
            async move {
                order.borrow_mut().push("emitting".to_string());
                image.emit("load", &load_event("a.png"));
                order.borrow_mut().push("emitted".to_string());
            }
        })
        .unwrap();

    pool.run();

    assert_eq!(
        *order.borrow(),
        vec!["waiting", "emitting", "emitted", "resumed with a.png"]
    );
}

#[test]
fn scoped_wait_releases_listener_after_completion() {
    let image = LocalEmitter::<LoadEvent>::new();
    let mut pool = LocalPool::new();

    let loaded = once_local_scoped(&image, "load");
    image.emit("load", &load_event("a.png"));

    assert_eq!(pool.run_until(loaded).target.src, "a.png");
    assert_eq!(image.listener_count("load"), 0);
}

#[test]
fn scoped_wait_dropped_while_pending_releases_listener() {
    let image = LocalEmitter::<LoadEvent>::new();

    {
        let mut loaded = pin!(once_local_scoped(&image, "load"));
        let mut cx = Context::from_waker(noop_waker_ref());

        assert!(loaded.as_mut().poll(&mut cx).is_pending());
        assert_eq!(image.listener_count("load"), 1);
    }

    assert_eq!(image.listener_count("load"), 0);
}

/// An event source that is not an emitter: a one-shot "loaded" signal that remembers its
/// listeners and fires them when told to.
#[derive(Default)]
struct Signal {
    listeners: RefCell<Vec<(ListenerId, LocalListener<u8>)>>,
    next_id: Cell<u64>,
}

impl Signal {
    fn fire(&self, value: u8) {
        for (_, listener) in self.listeners.borrow().iter() {
            listener(&value);
        }
    }
}

impl LocalEventSource for Signal {
    type Payload = u8;

    fn add_listener(&self, _event: EventName, listener: LocalListener<u8>) -> ListenerId {
        let id = ListenerId::from_raw(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, _event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(candidate, _)| *candidate != id);
        listeners.len() != before
    }
}

#[test]
fn custom_source_is_supported() {
    let signal = Signal::default();
    let mut pool = LocalPool::new();

    let first = once_local(&signal, "anything");
    let scoped = once_local_scoped(&signal, "anything");

    signal.fire(1);

    assert_eq!(pool.run_until(first), 1);
    assert_eq!(pool.run_until(scoped), 1);
    assert_eq!(signal.listeners.borrow().len(), 1);

    // The unscoped wait left its listener behind, so it sees this too but changes nothing.
    signal.fire(2);

    let mut later = pin!(once_local(&signal, "anything"));
    let mut cx = Context::from_waker(noop_waker_ref());
    assert!(later.as_mut().poll(&mut cx).is_pending());
}
