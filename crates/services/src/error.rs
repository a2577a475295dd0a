//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::QuestionId;
use storage::StorageError;

/// Errors emitted by grading backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GradingError {
    #[error("grading endpoint rejected the submission: {0}")]
    Rejected(String),
    #[error("grading request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while starting or submitting an attempt.
///
/// `Store` and `MissingQuestion` are blocking: they occur before the session
/// ever enters progress, so no partial session exists. `Grading` is
/// recoverable: the session returns to progress with its answers intact and
/// waits for an explicit retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error(transparent)]
    Store(#[from] StorageError),
    #[error("question {0} missing from the fetched set")]
    MissingQuestion(QuestionId),
    #[error(transparent)]
    Grading(#[from] GradingError),
}
