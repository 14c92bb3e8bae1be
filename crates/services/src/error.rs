//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz session engine and controller.
///
/// Every variant except `Empty` describes a rejected transition; the session
/// state is left untouched when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("no quiz in progress")]
    NotInProgress,
    #[error("no answer selected")]
    NoSelection,
    #[error("answer {index} is outside the {len} options")]
    AnswerOutOfRange { index: usize, len: usize },
    #[error("answer already submitted for this question")]
    AlreadySubmitted,
    #[error("current question has not been answered yet")]
    AwaitingSubmission,
}

/// Errors emitted by `PreferenceService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferenceServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
