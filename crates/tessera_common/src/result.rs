//! Common result and error types for the Tessera backend.

/// The standard result type for operations that can only fail on a bug.
///
/// `Err` indicates an internal logic error in Tessera, not a problem with the
/// model being mapped. Problems with the model are reported through the
/// per-crate error enums and the diagnostic sink.
pub type TessResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Tessera, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal mapping error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
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
