//! Error types for redline.

use thiserror::Error;

/// Result type alias using redline's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by provider construction and provider calls.
///
/// `FetchFailed` and `SubmitFailed` are the only recoverable provider errors:
/// neither one touches the in-memory session.
#[derive(Error, Debug)]
pub enum Error {
    /// No sentence was available, or the request could not complete.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// The provider rejected the final sentence, or the request could not complete.
    #[error("Submit failed: {0}")]
    SubmitFailed(String),

    /// The HTTP client could not be constructed from the given settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Precondition failures of [`crate::session::ReviewSession`] operations.
///
/// Returned directly by the session; front ends report them as feedback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("no sentence is loaded")]
    NoActiveSession,

    #[error("no word at position {0}")]
    NoSuchToken(usize),

    #[error("word at position {0} is already redacted")]
    AlreadyRedacted(usize),

    /// Word-level operations are unavailable while the free-text editor is open.
    #[error("the sentence is being edited")]
    EditInProgress,

    #[error("the sentence is not being edited")]
    NotEditing,
}
