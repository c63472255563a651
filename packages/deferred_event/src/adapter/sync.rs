use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tracing::{debug, trace};

use crate::{Deferred, EventName, EventSource, ListenerId};

/// Returns a thread-safe deferred value that settles with the payload of the first occurrence
/// of `event` on `source`.
///
/// This is the thread-safe counterpart of [`once_local()`][crate::once_local], with the same
/// listener lifetime caveats: the listener is never removed.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
///
/// use deferred_event::{Emitter, once};
/// use futures::executor::block_on;
///
/// let worker = Arc::new(Emitter::<u64>::new());
/// let finished = once(&*worker, "finished");
///
/// thread::spawn({
///     let worker = Arc::clone(&worker);
///     move || worker.emit("finished", &99)
/// });
///
/// assert_eq!(block_on(finished), 99);
/// ```
pub fn once<S>(source: &S, event: impl Into<EventName>) -> Deferred<S::Payload>
where
    S: EventSource + ?Sized,
    S::Payload: Clone + Send + 'static,
{
    let event = event.into();
    let (deferred, listener) = subscribe(source, event.clone());

    debug!(event = %event, listener = %listener, "awaiting first occurrence of event");

    deferred
}

/// Returns a thread-safe handle that resolves to the payload of the first occurrence of `event`
/// on `source`, removing its listener once done.
///
/// This is the thread-safe counterpart of [`once_local_scoped()`][crate::once_local_scoped].
pub fn once_scoped<S>(source: &S, event: impl Into<EventName>) -> ScopedDeferred<'_, S>
where
    S: EventSource + ?Sized,
    S::Payload: Clone + Send + 'static,
{
    let event = event.into();
    let (deferred, listener) = subscribe(source, event.clone());

    debug!(event = %event, listener = %listener, "awaiting first occurrence of event (scoped)");

    ScopedDeferred {
        source,
        event,
        listener: Some(listener),
        deferred,
    }
}

fn subscribe<S>(source: &S, event: EventName) -> (Deferred<S::Payload>, ListenerId)
where
    S: EventSource + ?Sized,
    S::Payload: Clone + Send + 'static,
{
    let (settler, deferred) = Deferred::pair();
    let listener_event = event.clone();

    let listener = source.add_listener(
        event,
        Box::new(move |payload: &S::Payload| {
            // Once the value is settled or nobody awaits it any more, the payload is not cloned.
            // Racing emissions on different threads may both pass the first check; the
            // settlement itself decides which one wins.
            if !settler.is_awaited() || settler.settle(payload.clone()).is_err() {
                trace!(event = %listener_event, "absorbing occurrence of event");
            }
        }),
    );

    (deferred, listener)
}

/// A thread-safe wait for the first occurrence of an event that cleans up after itself.
///
/// Created by [`once_scoped()`]. Resolves to the payload of the first occurrence.
/// The listener on the source is removed when this completes or is dropped.
#[must_use = "dropping the handle cancels the wait"]
pub struct ScopedDeferred<'s, S>
where
    S: EventSource + ?Sized,
{
    source: &'s S,
    event: EventName,

    /// `None` once the listener has been removed from the source.
    listener: Option<ListenerId>,

    deferred: Deferred<S::Payload>,
}

impl<S> ScopedDeferred<'_, S>
where
    S: EventSource + ?Sized,
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

impl<S> Future for ScopedDeferred<'_, S>
where
    S: EventSource + ?Sized,
{
    type Output = S::Payload;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let value = ready!(Pin::new(&mut this.deferred).poll(cx));
        this.release();

        Poll::Ready(value)
    }
}

impl<S> Drop for ScopedDeferred<'_, S>
where
    S: EventSource + ?Sized,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<S> fmt::Debug for ScopedDeferred<'_, S>
where
    S: EventSource + ?Sized,
{
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedDeferred")
            .field("event", &self.event)
            .field("listener", &self.listener)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
