//! Core of the redline sentence review tool.
//!
//! - [`session`]: the review state manager (redact, undo, edit, revert, submit)
//! - [`provider`]: the sentence provider seam and its HTTP implementation
//! - [`types`]: records, tokens, and submission payloads
//! - [`error`]: the crate's error types

pub mod error;
pub mod provider;
pub mod session;
pub mod types;

pub use error::{Error, Result, ReviewError};
pub use provider::{HttpSentenceProvider, ProviderConfig, SentenceProvider};
pub use session::{ReviewPhase, ReviewSession};
pub use types::{
    Acknowledgement, RecordId, RedactionEvent, ReviewProgress, SentenceRecord, Submission,
    WordToken, REDACTION_MARKER,
};
