//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by quiz sessions and the quiz workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question index {index} is out of range for a {len}-question quiz")]
    QuestionOutOfRange { index: usize, len: usize },
    #[error("option {option} is not valid for question {index}")]
    OptionOutOfRange { index: usize, option: u8 },
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
