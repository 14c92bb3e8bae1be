use std::sync::Arc;

use quiz_core::model::{CustomSelection, QuestionId, QuizMode};
use storage::repository::PreferenceRepository;
use tracing::warn;

use crate::error::PreferenceServiceError;

/// Reads and edits the persisted custom question selection.
#[derive(Clone)]
pub struct PreferenceService {
    repo: Arc<dyn PreferenceRepository>,
}

impl PreferenceService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferenceRepository>) -> Self {
        Self { repo }
    }

    /// Load the saved selection.
    ///
    /// Missing or unreadable data yields an empty selection.
    pub async fn load(&self) -> CustomSelection {
        match self.repo.load_selection().await {
            Ok(selection) => selection.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "stored custom selection unreadable, using empty selection");
                CustomSelection::default()
            }
        }
    }

    /// Persist `selection`, replacing what was stored.
    ///
    /// # Errors
    ///
    /// Returns `PreferenceServiceError` if the store rejects the write.
    pub async fn save(&self, selection: &CustomSelection) -> Result<(), PreferenceServiceError> {
        self.repo.save_selection(selection).await?;
        Ok(())
    }

    /// Flip membership of `id` and persist. Returns the new selection.
    ///
    /// # Errors
    ///
    /// Returns `PreferenceServiceError` if the store rejects the write.
    pub async fn toggle(&self, id: QuestionId) -> Result<CustomSelection, PreferenceServiceError> {
        let mut selection = self.load().await;
        selection.toggle(id);
        self.save(&selection).await?;
        Ok(selection)
    }

    /// # Errors
    ///
    /// Returns `PreferenceServiceError` if the store rejects the write.
    pub async fn replace(
        &self,
        ids: impl IntoIterator<Item = QuestionId>,
    ) -> Result<CustomSelection, PreferenceServiceError> {
        let selection = CustomSelection::from_ids(ids);
        self.save(&selection).await?;
        Ok(selection)
    }

    /// # Errors
    ///
    /// Returns `PreferenceServiceError` if the store rejects the write.
    pub async fn clear(&self) -> Result<(), PreferenceServiceError> {
        self.save(&CustomSelection::default()).await
    }

    /// A custom quiz over the saved selection.
    pub async fn custom_mode(&self, randomize_answers: bool) -> QuizMode {
        QuizMode::custom(self.load().await).with_randomized_answers(randomize_answers)
    }
}
