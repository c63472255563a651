use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::{DEFAULT_EMITTER_NAME, DEFAULT_MAX_LISTENERS};

/// Creates instances of [`LocalEmitter`][crate::LocalEmitter] and [`Emitter`][crate::Emitter].
///
/// All parameters are optional. Use `LocalEmitter::builder()` or `Emitter::builder()` to create
/// a new instance of this builder.
///
/// # Example
///
/// ```rust
/// use deferred_event::LocalEmitter;
///
/// let emitter = LocalEmitter::<String>::builder()
///     .name("image_loader")
///     .max_listeners(32)
///     .build();
///
/// assert_eq!(emitter.name(), "image_loader");
/// ```
pub struct EmitterBuilder<E> {
    pub(crate) name: Cow<'static, str>,

    /// `None` disables the leak warning.
    pub(crate) max_listeners: Option<usize>,

    _emitter: PhantomData<fn() -> E>,
}

impl<E> EmitterBuilder<E> {
    pub(crate) fn new() -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_EMITTER_NAME),
            max_listeners: Some(DEFAULT_MAX_LISTENERS),
            _emitter: PhantomData,
        }
    }

    /// Sets the diagnostic name of the emitter, included in every log event it produces.
    ///
    /// Defaults to [`DEFAULT_EMITTER_NAME`].
    #[must_use]
    pub fn name(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Sets how many listeners may be registered for a single event name before a possible
    /// listener leak is reported.
    ///
    /// Exceeding the threshold never prevents registration; it only logs a warning, once per
    /// event name. Defaults to [`DEFAULT_MAX_LISTENERS`].
    ///
    /// # Panics
    ///
    /// Panics if `max_listeners` is zero. Use
    /// [`unlimited_listeners()`][Self::unlimited_listeners] to disable the warning.
    #[must_use]
    pub fn max_listeners(self, max_listeners: usize) -> Self {
        assert!(
            max_listeners > 0,
            "max_listeners must be nonzero; use unlimited_listeners() to disable the warning"
        );

        Self {
            max_listeners: Some(max_listeners),
            ..self
        }
    }

    /// Disables the possible listener leak warning.
    #[must_use]
    pub fn unlimited_listeners(self) -> Self {
        Self {
            max_listeners: None,
            ..self
        }
    }
}

impl<E> fmt::Debug for EmitterBuilder<E> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterBuilder")
            .field("name", &self.name)
            .field("max_listeners", &self.max_listeners)
            .finish_non_exhaustive()
    }
}
