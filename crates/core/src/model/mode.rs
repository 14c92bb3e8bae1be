use crate::catalog::SubjectCatalog;
use crate::model::selection::CustomSelection;

/// Number of questions drawn for a random quiz.
pub const RANDOM_QUIZ_SIZE: usize = 36;

/// Which questions a session is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizScope {
    All,
    Module(u8),
    Subject(String),
    Random,
    Custom(CustomSelection),
}

/// A quiz start request: a scope plus the answer-shuffling flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizMode {
    pub scope: QuizScope,
    pub randomize_answers: bool,
}

impl QuizMode {
    #[must_use]
    pub fn new(scope: QuizScope) -> Self {
        Self {
            scope,
            randomize_answers: false,
        }
    }

    #[must_use]
    pub fn all() -> Self {
        Self::new(QuizScope::All)
    }

    #[must_use]
    pub fn module(number: u8) -> Self {
        Self::new(QuizScope::Module(number))
    }

    #[must_use]
    pub fn subject(name: impl Into<String>) -> Self {
        Self::new(QuizScope::Subject(name.into()))
    }

    #[must_use]
    pub fn random() -> Self {
        Self::new(QuizScope::Random)
    }

    #[must_use]
    pub fn custom(selection: CustomSelection) -> Self {
        Self::new(QuizScope::Custom(selection))
    }

    #[must_use]
    pub fn with_randomized_answers(mut self, randomize: bool) -> Self {
        self.randomize_answers = randomize;
        self
    }

    /// Wrong answers are re-queued in every scope except `Random`.
    #[must_use]
    pub fn requeues_wrong_answers(&self) -> bool {
        !self.is_random()
    }

    #[must_use]
    pub fn is_random(&self) -> bool {
        matches!(self.scope, QuizScope::Random)
    }

    /// Human-readable heading for the quiz. `random_sample_size` is the
    /// number of questions a random quiz draws.
    #[must_use]
    pub fn title(&self, catalog: &SubjectCatalog, random_sample_size: usize) -> String {
        match &self.scope {
            QuizScope::All => "All questions".to_string(),
            QuizScope::Module(number) => match catalog.module(*number) {
                Some(module) => format!("Module {number}: {}", module.name),
                None => format!("Module {number}"),
            },
            QuizScope::Subject(name) => catalog
                .subject(name)
                .map_or_else(|| "Unknown subject".to_string(), |s| s.display_name.clone()),
            QuizScope::Random => format!("{random_sample_size} random questions"),
            QuizScope::Custom(_) => "Custom quiz".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    #[test]
    fn only_random_skips_requeue() {
        assert!(QuizMode::all().requeues_wrong_answers());
        assert!(QuizMode::module(1).requeues_wrong_answers());
        assert!(QuizMode::subject("x").requeues_wrong_answers());
        assert!(QuizMode::custom(CustomSelection::new()).requeues_wrong_answers());
        assert!(!QuizMode::random().requeues_wrong_answers());
        assert!(!QuizMode::random()
            .with_randomized_answers(true)
            .requeues_wrong_answers());
    }

    #[test]
    fn titles_resolve_through_catalog() {
        let catalog = SubjectCatalog::default();
        let title = |mode: QuizMode| mode.title(&catalog, RANDOM_QUIZ_SIZE);
        assert_eq!(title(QuizMode::all()), "All questions");
        assert_eq!(title(QuizMode::module(2)), "Module 2: Databases");
        assert_eq!(title(QuizMode::module(9)), "Module 9");
        assert_eq!(title(QuizMode::subject("modul_3_criptografie")), "Cryptography");
        assert_eq!(title(QuizMode::subject("nope")), "Unknown subject");
        assert_eq!(title(QuizMode::random()), "36 random questions");
        assert_eq!(QuizMode::random().title(&catalog, 10), "10 random questions");
        let custom = CustomSelection::from_ids([QuestionId::new("a_0")]);
        assert_eq!(title(QuizMode::custom(custom)), "Custom quiz");
    }
}
