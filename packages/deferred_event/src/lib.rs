#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Await the first occurrence of a named event as a single-assignment deferred value.
//!
//! Event sources notify listeners through callbacks, every time an event occurs. This crate
//! wraps such a callback registration into a [`Future`][std::future::Future] that resolves with
//! the payload of the first occurrence, so code can simply `.await` an event instead of nesting
//! callbacks.
//!
//! The crate provides:
//!
//! * Adapters that turn the next occurrence of an event into a deferred value:
//!   [`once_local()`], [`once_local_scoped()`], [`once()`] and [`once_scoped()`].
//! * The deferred values themselves: [`LocalDeferred`] and [`Deferred`], settled through
//!   [`LocalSettler`] and [`Settler`].
//! * The contract any event source must satisfy: [`LocalEventSource`] and [`EventSource`].
//! * Ready-made event sources: [`LocalEmitter`] and [`Emitter`].
//!
//! Single-threaded (`Local*`) variants fit cooperative run-loops where the awaiting task and the
//! code that triggers the event share a thread. Thread-safe variants may settle on one thread
//! and resume the awaiter on another.
//!
//! # Example
//!
//! ```rust
//! use deferred_event::{LocalEmitter, once_local_scoped};
//! use futures::executor::LocalPool;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Loaded {
//!     src: String,
//! }
//!
//! let image = LocalEmitter::<Loaded>::new();
//! let mut pool = LocalPool::new();
//!
//! let loaded = once_local_scoped(&image, "load");
//!
//! image.emit(
//!     "load",
//!     &Loaded {
//!         src: "a.png".to_string(),
//!     },
//! );
//!
//! let value = pool.run_until(loaded);
//! assert_eq!(value.src, "a.png");
//! assert_eq!(image.listener_count("load"), 0);
//! ```
//!
//! # Limitations
//!
//! There is no built-in timeout. If the event never occurs, the wait never completes. Use the
//! scoped adapters and drop the handle to stop waiting, or race the wait against a timer
//! provided by your executor.
//!
//! # Logging
//!
//! Listener registration, emission and adapter lifecycle are reported via `tracing`, at `trace`
//! and `debug` levels. A `warn` event is logged when an emitter suspects a listener leak.

mod adapter;
mod deferred;
pub mod emitter;
mod error;
mod names;
mod source;

#[cfg(test)]
mod test_utils;

pub use adapter::*;
pub use deferred::*;
pub use emitter::{
    DEFAULT_EMITTER_NAME, DEFAULT_MAX_LISTENERS, Emitter, EmitterBuilder, LocalEmitter,
};
pub use error::*;
pub use names::*;
pub use source::*;

const ERR_POISONED_LOCK: &str = "encountered poisoned lock - program validity cannot be guaranteed";
