//! Single-assignment deferred values.
//!
//! A deferred value starts out pending and is settled at most once through its settler. The
//! deferred half implements [`Future`], resolving to the settled value. Any later settlement
//! attempt is rejected with [`AlreadySettled`][crate::AlreadySettled], so the value observed by
//! the awaiting code never changes.
//!
//! Dropping the deferred half releases any value it holds. A settlement that arrives after that
//! is accepted but discarded, and [`LocalSettler::is_awaited()`] lets the settling side skip
//! producing the value at all.
//!
//! Both single-threaded ([`LocalDeferred`]) and thread-safe ([`Deferred`]) variants exist.
//!
//! # Example
//!
//! ```rust
//! use deferred_event::LocalDeferred;
//! use futures::executor::block_on;
//!
//! let (settler, deferred) = LocalDeferred::<u32>::pair();
//!
//! settler.settle(1).unwrap();
//! assert!(settler.settle(2).is_err());
//!
//! assert_eq!(block_on(deferred), 1);
//! ```

mod local;
mod sync;

use std::mem;
use std::task::{Poll, Waker};

pub use local::*;
pub use sync::*;

/// The state shared between a settler and its deferred value.
#[derive(Debug)]
enum Slot<T> {
    /// Not yet settled. Holds the waker of whoever most recently polled the deferred value.
    Pending(Option<Waker>),

    /// Settled but the value has not yet been taken by the awaiter.
    Settled(T),

    /// The awaiter has taken the value, or dropped the deferred value after it was settled.
    /// The deferred value remains settled forever.
    Consumed,

    /// The deferred value was dropped while still pending. Nobody will ever observe a value.
    Abandoned,
}

impl<T> Slot<T> {
    const fn new() -> Self {
        Self::Pending(None)
    }

    /// Stores the value if the slot is still pending, or discards it if the deferred value was
    /// dropped before any settlement.
    ///
    /// On success, returns the waker (if any) that must be woken once the caller has released
    /// its borrow or lock on the slot. On failure, returns the rejected value.
    fn settle(&mut self, value: T) -> Result<Option<Waker>, T> {
        match self {
            Self::Pending(awaiter) => {
                let awaiter = awaiter.take();
                *self = Self::Settled(value);
                Ok(awaiter)
            }
            // The first settlement is still the one that counts, the value just has no reader.
            Self::Abandoned => {
                *self = Self::Consumed;
                Ok(None)
            }
            Self::Settled(_) | Self::Consumed => Err(value),
        }
    }

    fn poll_take(&mut self, waker: &Waker) -> Poll<T> {
        match self {
            Self::Pending(awaiter) => {
                match awaiter {
                    Some(existing) if existing.will_wake(waker) => {}
                    _ => *awaiter = Some(waker.clone()),
                }

                Poll::Pending
            }
            Self::Settled(_) => match mem::replace(self, Self::Consumed) {
                Self::Settled(value) => Poll::Ready(value),
                Self::Pending(_) | Self::Consumed | Self::Abandoned => {
                    unreachable!("slot state changed under us")
                }
            },
            Self::Consumed => panic!("deferred value polled after completion"),
            Self::Abandoned => unreachable!("an abandoned slot has no deferred value to poll it"),
        }
    }

    /// Marks the slot as no longer awaited because the deferred value is being dropped.
    ///
    /// Returns the previous state, which may hold a value or a waker. The caller drops it after
    /// releasing its borrow or lock on the slot.
    fn abandon(&mut self) -> Self {
        let next = if self.is_settled() {
            Self::Consumed
        } else {
            Self::Abandoned
        };

        mem::replace(self, next)
    }

    const fn is_awaited(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    const fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_) | Self::Consumed)
    }

    fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Self::Settled(value) => Some(value.clone()),
            Self::Pending(_) | Self::Consumed | Self::Abandoned => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use futures::task::noop_waker_ref;

    use super::*;

    #[test]
    fn slot_first_settlement_wins() {
        let mut slot = Slot::new();

        assert!(!slot.is_settled());
        assert!(matches!(slot.settle(1), Ok(None)));
        assert!(matches!(slot.settle(2), Err(2)));
        assert_eq!(slot.peek(), Some(1));
    }

    #[test]
    fn slot_hands_back_stored_waker_on_settle() {
        let mut slot = Slot::new();

        assert_eq!(slot.poll_take(noop_waker_ref()), Poll::Pending);

        let waker = slot.settle(5).unwrap();
        assert!(waker.is_some());
    }

    #[test]
    fn slot_stays_settled_after_consumption() {
        let mut slot = Slot::new();
        slot.settle("value").unwrap();

        assert_eq!(slot.poll_take(noop_waker_ref()), Poll::Ready("value"));
        assert!(slot.is_settled());
        assert_eq!(slot.peek(), None);
        assert!(matches!(slot.settle("late"), Err("late")));
    }

    #[test]
    #[should_panic(expected = "polled after completion")]
    fn slot_panics_when_polled_after_completion() {
        let mut slot = Slot::new();
        slot.settle(1).unwrap();

        _ = slot.poll_take(noop_waker_ref());
        _ = slot.poll_take(noop_waker_ref());
    }

    #[test]
    fn slot_abandoned_while_pending_accepts_one_settlement() {
        let mut slot = Slot::new();
        assert_eq!(slot.poll_take(noop_waker_ref()), Poll::Pending);

        let previous = slot.abandon();
        assert!(matches!(previous, Slot::Pending(Some(_))));

        assert!(!slot.is_awaited());
        assert!(!slot.is_settled());

        assert!(matches!(slot.settle(1), Ok(None)));
        assert!(slot.is_settled());
        assert!(matches!(slot.settle(2), Err(2)));
        assert_eq!(slot.peek(), None);
    }

    #[test]
    fn slot_abandoned_after_settlement_gives_up_value() {
        let mut slot = Slot::new();
        slot.settle("value").unwrap();
        assert!(!slot.is_awaited());

        let previous = slot.abandon();
        assert!(matches!(previous, Slot::Settled("value")));

        assert!(slot.is_settled());
        assert_eq!(slot.peek(), None);
        assert!(matches!(slot.settle("late"), Err("late")));
    }
}
