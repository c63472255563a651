//! Converts the next occurrence of a named event into a deferred value.
//!
//! Two forms are offered, each in a single-threaded and a thread-safe variant:
//!
//! * [`once_local()`] / [`once()`] register a listener that is never removed. The first
//!   occurrence settles the deferred value; every later occurrence still invokes the listener
//!   but is silently absorbed. Only use this form for events that meaningfully fire once, such
//!   as a "loaded" signal. For recurring events, it discards all but the first occurrence and
//!   keeps the listener alive for as long as the source lives.
//! * [`once_local_scoped()`] / [`once_scoped()`] return a handle that borrows the source and
//!   removes the listener as soon as the awaiting code receives the value, or when the handle is
//!   dropped before that (cancellation).
//!
//! Neither form has a timeout. If the event never occurs, the wait never completes.
//!
//! The payload is forwarded as a clone of the value the source passed to its listeners. Sources
//! whose events carry several values deliver them as one payload (e.g. a tuple), which is
//! forwarded unchanged.
//!
//! # Example
//!
//! ```rust
//! use deferred_event::{LocalEmitter, once_local};
//! use futures::executor::block_on;
//!
//! let image = LocalEmitter::<&'static str>::new();
//!
//! let loaded = once_local(&image, "load");
//!
//! image.emit("load", &"a.png");
//! image.emit("load", &"b.png");
//!
//! assert_eq!(block_on(loaded), "a.png");
//! ```

mod local;
mod sync;

pub use local::*;
pub use sync::*;
