use std::borrow::Cow;
use std::fmt::{self, Display};

/// The name of an event, as understood by an event source.
///
/// Event names are opaque to the adapter - they are passed through to the source unchanged.
pub type EventName = Cow<'static, str>;

/// Identifies one listener registration on an event source.
///
/// Returned when a listener is registered and used to remove that listener later. Identifiers
/// are unique within the source that issued them; comparing identifiers from different sources
/// is meaningless.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Creates an identifier from a raw value.
    ///
    /// Event source implementations outside this crate use this to mint their own identifiers.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value of the identifier.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl Display for ListenerId {
    #[cfg_attr(test, mutants::skip)] // No API contract for display format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}
