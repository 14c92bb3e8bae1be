use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::SubjectCatalog;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::preference_service::PreferenceService;
use crate::sessions::{QuizController, SessionBuilder};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    catalog: Arc<SubjectCatalog>,
    builder: SessionBuilder,
    preferences: Arc<PreferenceService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: Storage, clock: Clock, catalog: SubjectCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let builder = SessionBuilder::new(Arc::clone(&catalog), Arc::clone(&storage.questions));
        let preferences = Arc::new(PreferenceService::new(Arc::clone(&storage.preferences)));
        Self {
            clock,
            catalog,
            builder,
            preferences,
        }
    }

    /// Build services reading questions from `questions_dir` and keeping
    /// preferences in the `SQLite` database at `db_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn open(
        questions_dir: impl Into<PathBuf>,
        db_url: &str,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::open(questions_dir, db_url, clock).await?;
        Ok(Self::new(storage, clock, SubjectCatalog::default()))
    }

    #[must_use]
    pub fn with_random_sample_size(mut self, size: usize) -> Self {
        self.builder = self.builder.with_random_sample_size(size);
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn builder(&self) -> &SessionBuilder {
        &self.builder
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferenceService> {
        Arc::clone(&self.preferences)
    }

    /// A fresh controller sitting at mode selection.
    #[must_use]
    pub fn controller(&self) -> QuizController {
        QuizController::new(self.clock, self.builder.clone())
    }
}
