use async_trait::async_trait;
use quiz_core::model::{QuizResult, RecordId, SurveyResult};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Collection name holding one record per submitted quiz.
pub const QUIZ_COLLECTION: &str = "quiz_responses";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a quiz submission, including the survey section once
/// it has been merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRecord {
    pub id: RecordId,
    pub result: QuizResult,
    pub survey: Option<SurveyResult>,
}

impl QuizRecord {
    /// A freshly created record carries no survey section.
    #[must_use]
    pub fn new(id: RecordId, result: QuizResult) -> Self {
        Self {
            id,
            result,
            survey: None,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        self.result.identity().email()
    }
}

/// Repository contract for quiz records.
///
/// Mirrors the three durable-store operations the flow needs: append a new
/// record, look one up by identity email, and overwrite its survey fields.
/// There is no transaction spanning the create/update pair.
#[async_trait]
pub trait QuizRecordRepository: Send + Sync {
    /// Append a new quiz record and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn create_record(&self, result: &QuizResult) -> Result<RecordId, StorageError>;

    /// Fetch the first record whose identity email equals `email`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a missing record is
    /// `Ok(None)`, not an error.
    async fn find_by_email(&self, email: &str) -> Result<Option<QuizRecord>, StorageError>;

    /// Overwrite the survey fields of an existing record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no record has this id, or other
    /// storage errors.
    async fn merge_survey(&self, id: RecordId, survey: &SurveyResult) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<Vec<QuizRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl QuizRecordRepository for InMemoryRepository {
    async fn create_record(&self, result: &QuizResult) -> Result<RecordId, StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = RecordId::generate();
        guard.push(QuizRecord::new(id, result.clone()));
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<QuizRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().find(|r| r.email() == email).cloned())
    }

    async fn merge_survey(&self, id: RecordId, survey: &SurveyResult) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StorageError::NotFound)?;
        record.survey = Some(survey.clone());
        Ok(())
    }
}

/// Aggregates the record repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub records: Arc<dyn QuizRecordRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let records: Arc<dyn QuizRecordRepository> = Arc::new(repo);
        Self { records }
    }
}
