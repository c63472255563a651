use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::AlreadySettled;
use crate::deferred::Slot;

/// A single-threaded deferred value that resolves to a `T` once settled.
///
/// Awaiting the deferred value suspends only the awaiting task. The value is delivered when the
/// matching [`LocalSettler`] is used for the first time; the deferred value stays pending forever
/// if that never happens.
///
/// For a variant that can cross threads, see [`Deferred`][crate::Deferred].
///
/// # Example
///
/// ```rust
/// use deferred_event::LocalDeferred;
/// use futures::executor::block_on;
///
/// let (settler, deferred) = LocalDeferred::<String>::pair();
///
/// settler.settle("loaded".to_string()).unwrap();
///
/// assert_eq!(block_on(deferred), "loaded");
/// ```
pub struct LocalDeferred<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> LocalDeferred<T> {
    /// Creates a new pending deferred value, returning the settler and the deferred value.
    #[must_use]
    pub fn pair() -> (LocalSettler<T>, Self) {
        let slot = Rc::new(RefCell::new(Slot::new()));

        (
            LocalSettler {
                slot: Rc::clone(&slot),
            },
            Self { slot },
        )
    }

    /// Whether the deferred value has been settled.
    ///
    /// Once this returns `true`, it keeps returning `true` for the lifetime of the instance.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_settled()
    }

    /// Returns a copy of the settled value without consuming it.
    ///
    /// Returns `None` if the deferred value is still pending.
    #[must_use]
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        self.slot.borrow().peek()
    }
}

impl<T> Future for LocalDeferred<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.slot.borrow_mut().poll_take(cx.waker())
    }
}

impl<T> Drop for LocalDeferred<T> {
    fn drop(&mut self) {
        let previous = self.slot.borrow_mut().abandon();

        // Dropped outside the borrow, as the value's own drop may call back into the settler.
        drop(previous);
    }
}

impl<T> fmt::Debug for LocalDeferred<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalDeferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Settles a [`LocalDeferred`] with a value.
///
/// Settlers can be cloned freely; all clones settle the same deferred value and only the first
/// settlement is accepted.
pub struct LocalSettler<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> LocalSettler<T> {
    /// Settles the deferred value and wakes up the awaiter, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadySettled`] holding `value` if the deferred value was already settled.
    pub fn settle(&self, value: T) -> Result<(), AlreadySettled<T>> {
        // The borrow must end before waking, as the waker may call back into us.
        let awaiter = self
            .slot
            .borrow_mut()
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
        self.slot.borrow().is_settled()
    }

    /// Whether the deferred value is still pending and still exists.
    ///
    /// Returns `false` once the deferred value has been settled or dropped. A settlement made
    /// after the deferred value was dropped is accepted but the value is discarded.
    #[must_use]
    pub fn is_awaited(&self) -> bool {
        self.slot.borrow().is_awaited()
    }
}

impl<T> Clone for LocalSettler<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for LocalSettler<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSettler")
            .field("settled", &self.is_settled())
            .finish()
    }
}
