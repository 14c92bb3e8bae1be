//! Question provider backed by a directory of `<subject>.json` files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::Question;
use tracing::{debug, warn};

use crate::repository::{QuestionProvider, QuestionRecord, StorageError};

#[derive(Debug, Clone)]
pub struct JsonQuestionProvider {
    root: PathBuf,
}

impl JsonQuestionProvider {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a subject's file. Names that could escape the root are refused.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSubject` for empty names or names holding
    /// path separators or `..`.
    pub fn subject_path(&self, subject: &str) -> Result<PathBuf, StorageError> {
        let invalid = subject.is_empty()
            || subject.contains(['/', '\\'])
            || subject.contains("..");
        if invalid {
            return Err(StorageError::InvalidSubject(subject.to_string()));
        }
        Ok(self.root.join(format!("{subject}.json")))
    }
}

/// Decode a subject file. Records that break question invariants are skipped.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the payload is not a JSON array
/// of question records.
pub fn parse_subject(subject: &str, raw: &str) -> Result<Vec<Question>, StorageError> {
    Ok(parse_subject_positioned(subject, raw)?
        .into_iter()
        .map(|(_, question)| question)
        .collect())
}

/// Decode a subject file, keeping each valid question's index in the file.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the payload is not a JSON array
/// of question records.
pub fn parse_subject_positioned(
    subject: &str,
    raw: &str,
) -> Result<Vec<(usize, Question)>, StorageError> {
    let records: Vec<QuestionRecord> =
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;

    let mut questions = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match record.into_question() {
            Ok(question) => questions.push((index, question)),
            Err(err) => {
                warn!(subject, index, error = %err, "skipping invalid question record");
            }
        }
    }
    Ok(questions)
}

impl JsonQuestionProvider {
    async fn read_subject(&self, subject: &str) -> Result<String, StorageError> {
        let path = self.subject_path(subject)?;
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => StorageError::NotFound,
                _ => StorageError::Io(format!("{}: {err}", path.display())),
            })?;
        Ok(raw)
    }
}

#[async_trait]
impl QuestionProvider for JsonQuestionProvider {
    async fn fetch_by_subject(&self, subject: &str) -> Result<Vec<Question>, StorageError> {
        let raw = self.read_subject(subject).await?;
        let questions = parse_subject(subject, &raw)?;
        debug!(subject, count = questions.len(), "loaded subject file");
        Ok(questions)
    }

    async fn fetch_positioned(
        &self,
        subject: &str,
    ) -> Result<Vec<(usize, Question)>, StorageError> {
        let raw = self.read_subject(subject).await?;
        parse_subject_positioned(subject, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_path_refuses_traversal() {
        let provider = JsonQuestionProvider::new("/data/questions");
        assert_eq!(
            provider.subject_path("retele").unwrap(),
            PathBuf::from("/data/questions/retele.json")
        );
        for bad in ["", "../etc/passwd", "a/b", "a\\b", ".."] {
            assert!(matches!(
                provider.subject_path(bad),
                Err(StorageError::InvalidSubject(_))
            ));
        }
    }

    #[test]
    fn parse_keeps_valid_records_and_images() {
        let raw = r#"[
            {"question": "Q1", "answers": ["a", "b"], "correct_answer": 1},
            {"question": "Q2", "answers": ["a"], "correct_answer": 0},
            {"question": "Q3", "answers": ["a", "b", "c"], "correct_answer": 2, "image": "/img/q3.png"}
        ]"#;

        let questions = parse_subject("s", raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer(), 1);
        assert_eq!(questions[1].image(), Some("/img/q3.png"));
        assert!(questions.iter().all(|q| q.id().is_none()));
    }

    #[test]
    fn positions_survive_skipped_records() {
        let raw = r#"[
            {"question": "broken", "answers": ["only"], "correct_answer": 0},
            {"question": "second in file", "answers": ["a", "b"], "correct_answer": 0}
        ]"#;

        let positioned = parse_subject_positioned("s", raw).unwrap();
        assert_eq!(positioned.len(), 1);
        assert_eq!(positioned[0].0, 1);
        assert_eq!(positioned[0].1.prompt(), "second in file");
    }

    #[test]
    fn parse_rejects_non_array_payload() {
        assert!(matches!(
            parse_subject("s", r#"{"question": "Q"}"#),
            Err(StorageError::Serialization(_))
        ));
    }
}
