//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{Letter, QuizError, SubjectError};
use quiz_core::parser::ParseError;
use quiz_core::session::AnswerSheetError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SubjectService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubjectServiceError {
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while turning pasted quiz text into persisted records.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthoringError {
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<SubjectServiceError> for AuthoringError {
    fn from(err: SubjectServiceError) -> Self {
        match err {
            SubjectServiceError::Subject(e) => AuthoringError::Subject(e),
            SubjectServiceError::Storage(e) => AuthoringError::Storage(e),
        }
    }
}

/// Errors emitted while taking a quiz.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz not found")]
    QuizNotFound,
    #[error("quiz has no questions")]
    Empty,
    #[error("option {letter} is not part of question {index}")]
    UnknownOption { index: usize, letter: Letter },
    #[error(transparent)]
    Sheet(#[from] AnswerSheetError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
