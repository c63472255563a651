use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tracing::{debug, trace};

use crate::{EventName, ListenerId, LocalDeferred, LocalEventSource};

/// Returns a deferred value that settles with the payload of the first occurrence of `event`
/// on `source`.
///
/// Registers exactly one listener, which is never removed: later occurrences still invoke it but
/// have no effect on the already settled value. Prefer [`once_local_scoped()`] unless the event
/// is known to fire at most once or the source is short-lived.
///
/// If the event never occurs, the deferred value stays pending forever.
///
/// # Example
///
/// ```rust
/// use deferred_event::{LocalEmitter, once_local};
/// use futures::executor::block_on;
///
/// let document = LocalEmitter::<()>::new();
/// let ready = once_local(&document, "ready");
///
/// document.emit("ready", &());
///
/// block_on(ready);
/// assert_eq!(document.listener_count("ready"), 1);
/// ```
pub fn once_local<S>(source: &S, event: impl Into<EventName>) -> LocalDeferred<S::Payload>
where
    S: LocalEventSource + ?Sized,
    S::Payload: Clone + 'static,
{
    let event = event.into();
    let (deferred, listener) = subscribe(source, event.clone());

    debug!(event = %event, listener = %listener, "awaiting first occurrence of event");

    deferred
}

/// Returns a handle that resolves to the payload of the first occurrence of `event` on
/// `source`, removing its listener once done.
///
/// The listener is removed when the handle completes or when it is dropped before completing,
/// whichever happens first. Repeat occurrences that happen before the awaiting code observes
/// the value are absorbed, as with [`once_local()`].
///
/// # Example
///
/// ```rust
/// use deferred_event::{LocalEmitter, once_local_scoped};
/// use futures::executor::block_on;
///
/// let image = LocalEmitter::<u32>::new();
/// let loaded = once_local_scoped(&image, "load");
///
/// image.emit("load", &200);
///
/// assert_eq!(block_on(loaded), 200);
/// assert_eq!(image.listener_count("load"), 0);
/// ```
pub fn once_local_scoped<S>(source: &S, event: impl Into<EventName>) -> ScopedLocalDeferred<'_, S>
where
    S: LocalEventSource + ?Sized,
    S::Payload: Clone + 'static,
{
    let event = event.into();
    let (deferred, listener) = subscribe(source, event.clone());

    debug!(event = %event, listener = %listener, "awaiting first occurrence of event (scoped)");

    ScopedLocalDeferred {
        source,
        event,
        listener: Some(listener),
        deferred,
    }
}

fn subscribe<S>(source: &S, event: EventName) -> (LocalDeferred<S::Payload>, ListenerId)
where
    S: LocalEventSource + ?Sized,
    S::Payload: Clone + 'static,
{
    let (settler, deferred) = LocalDeferred::pair();
    let listener_event = event.clone();

    let listener = source.add_listener(
        event,
        Box::new(move |payload: &S::Payload| {
            // Once the value is settled or nobody awaits it any more, the payload is not cloned.
            if !settler.is_awaited() || settler.settle(payload.clone()).is_err() {
                trace!(event = %listener_event, "absorbing occurrence of event");
            }
        }),
    );

    (deferred, listener)
}

/// A single-threaded wait for the first occurrence of an event that cleans up after itself.
///
/// Created by [`once_local_scoped()`]. Resolves to the payload of the first occurrence.
/// The listener on the source is removed when this completes or is dropped.
#[must_use = "dropping the handle cancels the wait"]
pub struct ScopedLocalDeferred<'s, S>
where
    S: LocalEventSource + ?Sized,
{
    source: &'s S,
    event: EventName,

    /// `None` once the listener has been removed from the source.
    listener: Option<ListenerId>,

    deferred: LocalDeferred<S::Payload>,
}

impl<S> ScopedLocalDeferred<'_, S>
where
    S: LocalEventSource + ?Sized,
{
    /// Whether the event has occurred.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.deferred.is_settled()
    }

    /// Stops waiting and removes the listener from the source.
    ///
    /// Equivalent to dropping the handle.
    pub fn cancel(self) {
        debug!(event = %self.event, settled = self.is_settled(), "cancelling wait for event");
    }

    fn release(&mut self) {
        if let Some(listener) = self.listener.take() {
            let removed = self.source.remove_listener(&self.event, listener);

            debug!(event = %self.event, listener = %listener, removed, "released event listener");
        }
    }
}

impl<S> Future for ScopedLocalDeferred<'_, S>
where
    S: LocalEventSource + ?Sized,
{
    type Output = S::Payload;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let value = ready!(Pin::new(&mut this.deferred).poll(cx));
        this.release();

        Poll::Ready(value)
    }
}

impl<S> Drop for ScopedLocalDeferred<'_, S>
where
    S: LocalEventSource + ?Sized,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<S> fmt::Debug for ScopedLocalDeferred<'_, S>
where
    S: LocalEventSource + ?Sized,
{
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedLocalDeferred")
            .field("event", &self.event)
            .field("listener", &self.listener)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
