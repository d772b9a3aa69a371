//! Result and error types for invariant violations.

/// The result type for operations that can only fail because of a bug.
///
/// `Err` never describes bad user input: an infeasible topology or an
/// inconsistent configuration has its own error type in the crate that
/// detects it. An [`InternalError`] means a bookkeeping invariant (link usage,
/// route contiguity, transaction pairing) was broken.
pub type NocResult<T> = Result<T, InternalError>;

/// An internal error indicating a broken invariant in the NoC bookkeeping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("internal NoC error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
