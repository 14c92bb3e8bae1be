use std::sync::Arc;

use quiz_core::SubjectCatalog;
use quiz_core::model::{CustomSelection, Question, QuestionId, QuizMode, QuizScope, RANDOM_QUIZ_SIZE};
use storage::repository::{QuestionProvider, StorageError};
use tracing::{debug, warn};

use super::shuffle::shuffled;

/// Resolves a quiz mode into the initial working set of a session.
///
/// Building never fails: a subject the provider cannot deliver contributes
/// no questions, so the worst case is an empty set.
#[derive(Clone)]
pub struct SessionBuilder {
    catalog: Arc<SubjectCatalog>,
    provider: Arc<dyn QuestionProvider>,
    random_sample_size: usize,
}

impl SessionBuilder {
    #[must_use]
    pub fn new(catalog: Arc<SubjectCatalog>, provider: Arc<dyn QuestionProvider>) -> Self {
        Self {
            catalog,
            provider,
            random_sample_size: RANDOM_QUIZ_SIZE,
        }
    }

    /// Override how many questions a random quiz draws.
    #[must_use]
    pub fn with_random_sample_size(mut self, size: usize) -> Self {
        self.random_sample_size = size;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn random_sample_size(&self) -> usize {
        self.random_sample_size
    }

    /// Build the working set for `mode`: resolve its scope, then shuffle once.
    pub async fn build(&self, mode: &QuizMode) -> Vec<Question> {
        let questions = shuffled(self.resolve(&mode.scope).await);
        debug!(count = questions.len(), scope = ?mode.scope, "built working set");
        questions
    }

    /// Resolve a scope to its questions in catalog order, before the final
    /// shuffle.
    ///
    /// `Random` draws a uniform sample of `random_sample_size` questions from
    /// the whole pool, so its order is already random.
    pub async fn resolve(&self, scope: &QuizScope) -> Vec<Question> {
        match scope {
            QuizScope::All => self.load_all().await,
            QuizScope::Module(number) => {
                if self.catalog.module(*number).is_none() {
                    debug!(module = number, "unknown module");
                    return Vec::new();
                }
                let names: Vec<String> = self
                    .catalog
                    .subjects_in_module(*number)
                    .map(|s| s.name.clone())
                    .collect();
                self.load_subjects(&names).await
            }
            QuizScope::Subject(name) => self.load_subject(name).await,
            QuizScope::Random => {
                let mut sample = shuffled(self.load_all().await);
                sample.truncate(self.random_sample_size);
                sample
            }
            QuizScope::Custom(selection) => self.load_custom(selection).await,
        }
    }

    /// Every question with its `<subject>_<index>` identifier attached, in
    /// catalog order. Feeds the custom-question picker.
    ///
    /// The index is the question's position in the stored subject, so ids do
    /// not shift when the source skips invalid records.
    pub async fn load_pool_with_ids(&self) -> Vec<Question> {
        let mut pool = Vec::new();
        for name in self.all_subject_names() {
            let fetched = self.provider.fetch_positioned(&name).await;
            pool.extend(
                degrade_to_empty(&name, fetched)
                    .into_iter()
                    .map(|(index, q)| q.with_id(QuestionId::for_subject(&name, index))),
            );
        }
        pool
    }

    async fn load_custom(&self, selection: &CustomSelection) -> Vec<Question> {
        if selection.is_empty() {
            return Vec::new();
        }
        self.load_pool_with_ids()
            .await
            .into_iter()
            .filter(|q| q.id().is_some_and(|id| selection.contains(id)))
            .collect()
    }

    async fn load_all(&self) -> Vec<Question> {
        self.load_subjects(&self.all_subject_names()).await
    }

    fn all_subject_names(&self) -> Vec<String> {
        self.catalog
            .subjects_in_order()
            .map(|s| s.name.clone())
            .collect()
    }

    async fn load_subjects(&self, names: &[String]) -> Vec<Question> {
        let mut questions = Vec::new();
        for name in names {
            questions.extend(self.load_subject(name).await);
        }
        questions
    }

    async fn load_subject(&self, name: &str) -> Vec<Question> {
        degrade_to_empty(name, self.provider.fetch_by_subject(name).await)
    }
}

fn degrade_to_empty<T>(subject: &str, fetched: Result<Vec<T>, StorageError>) -> Vec<T> {
    match fetched {
        Ok(items) => items,
        Err(StorageError::NotFound) => {
            debug!(subject, "no questions stored for subject");
            Vec::new()
        }
        Err(err) => {
            warn!(subject, error = %err, "failed to load subject, treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{ModuleInfo, Subject};
    use storage::repository::InMemoryQuestionBank;

    fn question(prompt: String) -> Question {
        Question::new(prompt, vec!["a".into(), "b".into()], 0).unwrap()
    }

    fn subject(name: &str, module: u8) -> Subject {
        Subject {
            name: name.into(),
            display_name: name.into(),
            module,
        }
    }

    fn catalog() -> Arc<SubjectCatalog> {
        let modules = (1..=2)
            .map(|number| ModuleInfo {
                number,
                name: format!("M{number}"),
            })
            .collect();
        let subjects = vec![subject("alpha", 1), subject("beta", 1), subject("gamma", 2)];
        Arc::new(SubjectCatalog::new(modules, subjects).unwrap())
    }

    fn builder_with(counts: &[(&str, usize)]) -> (SessionBuilder, InMemoryQuestionBank) {
        let bank = InMemoryQuestionBank::new();
        for (name, count) in counts {
            let questions = (0..*count).map(|i| question(format!("{name}-{i}"))).collect();
            bank.insert_subject(*name, questions).unwrap();
        }
        let builder = SessionBuilder::new(catalog(), Arc::new(bank.clone()));
        (builder, bank)
    }

    fn prompts(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(Question::prompt).collect()
    }

    #[tokio::test]
    async fn all_concatenates_in_catalog_order() {
        let (builder, _) = builder_with(&[("gamma", 1), ("alpha", 2), ("beta", 1)]);
        let resolved = builder.resolve(&QuizScope::All).await;
        assert_eq!(
            prompts(&resolved),
            ["alpha-0", "alpha-1", "beta-0", "gamma-0"]
        );
    }

    #[tokio::test]
    async fn module_takes_only_its_subjects() {
        let (builder, _) = builder_with(&[("alpha", 1), ("beta", 1), ("gamma", 3)]);
        let resolved = builder.resolve(&QuizScope::Module(1)).await;
        assert_eq!(prompts(&resolved), ["alpha-0", "beta-0"]);
        assert!(builder.resolve(&QuizScope::Module(7)).await.is_empty());
    }

    #[tokio::test]
    async fn subject_failures_degrade_to_empty() {
        let (builder, bank) = builder_with(&[("alpha", 2), ("beta", 2)]);
        bank.fail_subject("alpha").unwrap();

        assert!(builder.build(&QuizMode::subject("alpha")).await.is_empty());
        assert!(builder.build(&QuizMode::subject("missing")).await.is_empty());
        let all = builder.build(&QuizMode::all()).await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn random_draws_uniform_sample_without_duplicates() {
        let (builder, _) = builder_with(&[("alpha", 30), ("beta", 30), ("gamma", 30)]);
        let sample = builder.build(&QuizMode::random()).await;
        assert_eq!(sample.len(), RANDOM_QUIZ_SIZE);

        let mut seen = prompts(&sample);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), RANDOM_QUIZ_SIZE);
    }

    #[tokio::test]
    async fn random_with_small_pool_takes_everything() {
        let (builder, _) = builder_with(&[("alpha", 3)]);
        let builder = builder.with_random_sample_size(10);
        assert_eq!(builder.build(&QuizMode::random()).await.len(), 3);
    }

    #[tokio::test]
    async fn pool_ids_follow_subject_ordinals() {
        let (builder, _) = builder_with(&[("alpha", 2), ("gamma", 1)]);
        let pool = builder.load_pool_with_ids().await;
        let ids: Vec<_> = pool.iter().map(|q| q.id().unwrap().as_str()).collect();
        assert_eq!(ids, ["alpha_0", "alpha_1", "gamma_0"]);
    }

    /// Serves a subject whose records 0 and 2 were dropped by the source.
    struct GappedSource;

    #[async_trait::async_trait]
    impl QuestionProvider for GappedSource {
        async fn fetch_by_subject(&self, subject: &str) -> Result<Vec<Question>, StorageError> {
            Ok(self
                .fetch_positioned(subject)
                .await?
                .into_iter()
                .map(|(_, q)| q)
                .collect())
        }

        async fn fetch_positioned(
            &self,
            subject: &str,
        ) -> Result<Vec<(usize, Question)>, StorageError> {
            if subject != "alpha" {
                return Err(StorageError::NotFound);
            }
            Ok(vec![
                (1, question("second in file".into())),
                (3, question("fourth in file".into())),
            ])
        }
    }

    #[tokio::test]
    async fn pool_ids_keep_file_positions_across_skipped_records() {
        let builder = SessionBuilder::new(catalog(), Arc::new(GappedSource));
        let pool = builder.load_pool_with_ids().await;
        let ids: Vec<_> = pool
            .iter()
            .map(|q| (q.id().unwrap().as_str(), q.prompt()))
            .collect();
        assert_eq!(
            ids,
            [("alpha_1", "second in file"), ("alpha_3", "fourth in file")]
        );

        let selection = CustomSelection::from_ids([QuestionId::new("alpha_3")]);
        let built = builder.build(&QuizMode::custom(selection)).await;
        assert_eq!(prompts(&built), ["fourth in file"]);
    }

    #[tokio::test]
    async fn custom_keeps_only_selected_ids() {
        let (builder, _) = builder_with(&[("alpha", 3), ("beta", 3)]);
        let selection = CustomSelection::from_ids([
            QuestionId::new("beta_2"),
            QuestionId::new("alpha_0"),
            QuestionId::new("zeta_9"),
        ]);

        let built = builder.build(&QuizMode::custom(selection.clone())).await;
        assert_eq!(built.len(), 2);
        assert!(built
            .iter()
            .all(|q| q.id().is_some_and(|id| selection.contains(id))));

        assert!(builder
            .build(&QuizMode::custom(CustomSelection::new()))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn non_custom_builds_carry_no_ids() {
        let (builder, _) = builder_with(&[("alpha", 2)]);
        let built = builder.build(&QuizMode::all()).await;
        assert!(built.iter().all(|q| q.id().is_none()));
    }
}
