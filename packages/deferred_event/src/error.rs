use thiserror::Error;

/// Returned when settling a deferred value that has already been settled.
///
/// The value that was rejected is handed back to the caller, who may inspect or reuse it.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("deferred value has already been settled")]
pub struct AlreadySettled<T> {
    value: T,
}

impl<T> AlreadySettled<T> {
    pub(crate) fn new(value: T) -> Self {
        Self { value }
    }

    /// Returns the value that was rejected by the settlement attempt.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn already_settled_returns_rejected_value() {
        let error = AlreadySettled::new("second");
        assert_eq!(error.into_value(), "second");
    }

    #[test]
    fn already_settled_display_writes_message() {
        let error = AlreadySettled::new(5_u8);

        assert!(!error.to_string().is_empty());
    }
}
