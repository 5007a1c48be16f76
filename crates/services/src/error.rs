//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{IdentityError, ResponseError, SurveyError};
use storage::repository::StorageError;
use storage::session::SessionStoreError;

/// Errors emitted by `QuizSessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("quiz has not been started")]
    NotStarted,
    #[error("quiz is already in progress")]
    AlreadyStarted,
    #[error("quiz was already submitted")]
    AlreadySubmitted,
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

impl QuizSessionError {
    /// The message shown to the user, matching the entry form's copy.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Session(_) => {
                "Submission failed. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Errors emitted by `SurveySubmissionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SurveySubmissionError {
    #[error("User data not found! Please complete the quiz first.")]
    MissingHandoff,
    #[error("User quiz data not found! Please retake the quiz.")]
    RecordMissing,
    #[error("survey was already submitted")]
    AlreadySubmitted,
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error(transparent)]
    Survey(#[from] SurveyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

impl SurveySubmissionError {
    /// The message shown to the user, matching the survey form's copy.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Session(_) => {
                "Failed to submit survey. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}
