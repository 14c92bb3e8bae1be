use async_trait::async_trait;
use quiz_core::model::{CustomSelection, Question, QuestionError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("invalid subject name: {0}")]
    InvalidSubject(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// On-disk shape of a question, as found in the per-subject JSON files.
///
/// Kept separate from the domain `Question` so that malformed data is caught
/// at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            question: question.prompt().to_owned(),
            answers: question.answers().to_vec(),
            correct_answer: question.correct_answer(),
            image: question.image().map(str::to_owned),
        }
    }

    /// Convert the record into a validated domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the record breaks a question invariant.
    pub fn into_question(self) -> Result<Question, QuestionError> {
        Ok(Question::new(self.question, self.answers, self.correct_answer)?.with_image(self.image))
    }
}

/// Source of question data, one subject at a time.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch every question of a subject, in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be read or decoded.
    async fn fetch_by_subject(&self, subject: &str) -> Result<Vec<Question>, StorageError>;

    /// Like `fetch_by_subject`, paired with each question's position in the
    /// stored subject. Positions stay stable when a source skips records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be read or decoded.
    async fn fetch_positioned(
        &self,
        subject: &str,
    ) -> Result<Vec<(usize, Question)>, StorageError> {
        Ok(self
            .fetch_by_subject(subject)
            .await?
            .into_iter()
            .enumerate()
            .collect())
    }
}

/// Persistence port for the custom question selection.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Read the stored selection, `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for corrupt records, or other
    /// storage errors.
    async fn load_selection(&self) -> Result<Option<CustomSelection>, StorageError>;

    /// Replace the stored selection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the selection cannot be stored.
    async fn save_selection(&self, selection: &CustomSelection) -> Result<(), StorageError>;
}

/// In-memory question source for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryQuestionBank {
    subjects: Arc<Mutex<HashMap<String, Vec<Question>>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryQuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the questions of a subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_subject(
        &self,
        subject: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .subjects
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(subject.into(), questions);
        Ok(())
    }

    /// Make every fetch of `subject` fail, simulating a broken source.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn fail_subject(&self, subject: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .failing
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(subject.into());
        Ok(())
    }
}

#[async_trait]
impl QuestionProvider for InMemoryQuestionBank {
    async fn fetch_by_subject(&self, subject: &str) -> Result<Vec<Question>, StorageError> {
        {
            let failing = self
                .failing
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            if failing.contains(subject) {
                return Err(StorageError::Connection(format!(
                    "subject {subject} is unavailable"
                )));
            }
        }

        let guard = self
            .subjects
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(subject).cloned().ok_or(StorageError::NotFound)
    }
}

/// In-memory preference store. Can hold a raw record to exercise corrupt-data
/// handling.
#[derive(Clone, Default)]
pub struct InMemoryPreferences {
    raw: Arc<Mutex<Option<String>>>,
}

impl InMemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw JSON record verbatim.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_raw(&self, raw: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .raw
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(raw.into());
        Ok(())
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryPreferences {
    async fn load_selection(&self) -> Result<Option<CustomSelection>, StorageError> {
        let guard = self
            .raw
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .as_deref()
            .map(decode_selection)
            .transpose()
    }

    async fn save_selection(&self, selection: &CustomSelection) -> Result<(), StorageError> {
        let encoded = encode_selection(selection)?;
        let mut guard = self
            .raw
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(encoded);
        Ok(())
    }
}

pub(crate) fn encode_selection(selection: &CustomSelection) -> Result<String, StorageError> {
    serde_json::to_string(selection).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn decode_selection(raw: &str) -> Result<CustomSelection, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Aggregates the question source and preference store behind trait objects
/// for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionProvider>,
    pub preferences: Arc<dyn PreferenceRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(bank: InMemoryQuestionBank) -> Self {
        Self {
            questions: Arc::new(bank),
            preferences: Arc::new(InMemoryPreferences::new()),
        }
    }
}
