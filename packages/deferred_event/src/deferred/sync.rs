use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use crate::deferred::Slot;
use crate::{AlreadySettled, ERR_POISONED_LOCK};

/// A thread-safe deferred value that resolves to a `T` once settled.
///
/// The deferred value and its [`Settler`] may live on different threads. Otherwise this behaves
/// like [`LocalDeferred`][crate::LocalDeferred].
///
/// # Example
///
/// ```rust
/// use std::thread;
///
/// use deferred_event::Deferred;
/// use futures::executor::block_on;
///
/// let (settler, deferred) = Deferred::<u64>::pair();
///
/// thread::spawn(move || settler.settle(7).unwrap());
///
/// assert_eq!(block_on(deferred), 7);
/// ```
pub struct Deferred<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Deferred<T> {
    /// Creates a new pending deferred value, returning the settler and the deferred value.
    #[must_use]
    pub fn pair() -> (Settler<T>, Self) {
        let slot = Arc::new(Mutex::new(Slot::new()));

        (
            Settler {
                slot: Arc::clone(&slot),
            },
            Self { slot },
        )
    }

    /// Whether the deferred value has been settled.
    ///
    /// Once this returns `true`, it keeps returning `true` for the lifetime of the instance.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        lock(&self.slot).is_settled()
    }

    /// Returns a copy of the settled value without consuming it.
    ///
    /// Returns `None` if the deferred value is still pending.
    #[must_use]
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        lock(&self.slot).peek()
    }
}

impl<T> Future for Deferred<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        lock(&self.slot).poll_take(cx.waker())
    }
}

impl<T> Drop for Deferred<T> {
    fn drop(&mut self) {
        // A panic elsewhere must not turn into a double panic here, so poisoning is ignored.
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .abandon();

        // Dropped outside the lock, as the value's own drop may call back into the settler.
        drop(previous);
    }
}

impl<T> fmt::Debug for Deferred<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Settles a [`Deferred`] with a value, from any thread.
///
/// Settlers can be cloned freely; all clones settle the same deferred value and only the first
/// settlement is accepted, even when clones race from different threads.
pub struct Settler<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Settler<T> {
    /// Settles the deferred value and wakes up the awaiter, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadySettled`] holding `value` if the deferred value was already settled.
    pub fn settle(&self, value: T) -> Result<(), AlreadySettled<T>> {
        // The lock must be released before waking, as the waker may poll on another thread.
        let awaiter = lock(&self.slot)
            .settle(value)
            .map_err(AlreadySettled::new)?;

        if let Some(awaiter) = awaiter {
            awaiter.wake();
        }

        Ok(())
    }

    /// Whether the deferred value has been settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        lock(&self.slot).is_settled()
    }

    /// Whether the deferred value is still pending and still exists.
    ///
    /// Returns `false` once the deferred value has been settled or dropped. A settlement made
    /// after the deferred value was dropped is accepted but the value is discarded.
    #[must_use]
    pub fn is_awaited(&self) -> bool {
        lock(&self.slot).is_awaited()
    }
}

impl<T> Clone for Settler<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for Settler<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler")
            .field("settled", &self.is_settled())
            .finish()
    }
}

fn lock<T>(slot: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    slot.lock().expect(ERR_POISONED_LOCK)
}
