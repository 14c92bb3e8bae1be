use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question. Immutable for the lifetime of a session.
///
/// `correct_answer` always indexes into the original `answers` list, no matter
/// how the answers are displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    answers: Vec<String>,
    correct_answer: usize,
    image: Option<String>,
    id: Option<QuestionId>,
}

impl Question {
    /// Minimum number of answer options a question must offer.
    pub const MIN_ANSWERS: usize = 2;

    /// Validate and build a question.
    ///
    /// Prompt and answer text is kept verbatim, including embedded newlines
    /// and tabs.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, fewer than two answers
    /// are given, or `correct_answer` does not index into `answers`.
    pub fn new(
        prompt: impl Into<String>,
        answers: Vec<String>,
        correct_answer: usize,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if answers.len() < Self::MIN_ANSWERS {
            return Err(QuestionError::TooFewAnswers { len: answers.len() });
        }
        if correct_answer >= answers.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: correct_answer,
                len: answers.len(),
            });
        }

        Ok(Self {
            prompt,
            answers,
            correct_answer,
            image: None,
            id: None,
        })
    }

    /// Attach an image reference. Blank references are dropped.
    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image.filter(|path| !path.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn id(&self) -> Option<&QuestionId> {
        self.id.as_ref()
    }

    /// Grades an answer given by its index in the original answer list.
    #[must_use]
    pub fn is_correct(&self, original_index: usize) -> bool {
        original_index == self.correct_answer
    }

    /// Resolves the image reference against a base URL.
    ///
    /// A leading `/` on the stored path is dropped so the base controls the
    /// prefix.
    #[must_use]
    pub fn image_url(&self, base_url: &str) -> Option<String> {
        self.image
            .as_deref()
            .map(|path| format!("{base_url}{}", path.trim_start_matches('/')))
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt is empty")]
    EmptyPrompt,

    #[error("question needs at least two answers, got {len}")]
    TooFewAnswers { len: usize },

    #[error("correct answer {index} is outside the {len} answers")]
    CorrectAnswerOutOfRange { index: usize, len: usize },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("A{i}")).collect()
    }

    #[test]
    fn rejects_blank_prompt() {
        let err = Question::new("  \n\t", answers(3), 0).unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn rejects_single_answer() {
        let err = Question::new("Q", answers(1), 0).unwrap_err();
        assert_eq!(err, QuestionError::TooFewAnswers { len: 1 });
    }

    #[test]
    fn rejects_out_of_range_correct_answer() {
        let err = Question::new("Q", answers(4), 4).unwrap_err();
        assert_eq!(
            err,
            QuestionError::CorrectAnswerOutOfRange { index: 4, len: 4 }
        );
    }

    #[test]
    fn keeps_layout_whitespace() {
        let q = Question::new("int main() {\n\treturn 0;\n}", answers(2), 1).unwrap();
        assert_eq!(q.prompt(), "int main() {\n\treturn 0;\n}");
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
    }

    #[test]
    fn image_url_strips_leading_slash() {
        let q = Question::new("Q", answers(2), 0)
            .unwrap()
            .with_image(Some("/images/net.png".into()));
        assert_eq!(
            q.image_url("/quiz-app/").as_deref(),
            Some("/quiz-app/images/net.png")
        );

        let blank = Question::new("Q", answers(2), 0)
            .unwrap()
            .with_image(Some(" ".into()));
        assert_eq!(blank.image(), None);
    }
}
