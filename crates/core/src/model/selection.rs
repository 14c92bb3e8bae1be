use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// User-picked subset of questions for custom quizzes.
///
/// Keeps insertion order and never holds the same identifier twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSelection {
    #[serde(deserialize_with = "dedup_ids")]
    selected_question_ids: Vec<QuestionId>,
}

impl CustomSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from arbitrary ids; later duplicates are dropped.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = QuestionId>) -> Self {
        let mut selection = Self::new();
        selection.select_all(ids);
        selection
    }

    #[must_use]
    pub fn ids(&self) -> &[QuestionId] {
        &self.selected_question_ids
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.selected_question_ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected_question_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_question_ids.is_empty()
    }

    /// Returns `true` if the id was newly added.
    pub fn insert(&mut self, id: QuestionId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.selected_question_ids.push(id);
        true
    }

    /// Returns `true` if the id was present.
    pub fn remove(&mut self, id: &QuestionId) -> bool {
        let before = self.selected_question_ids.len();
        self.selected_question_ids.retain(|existing| existing != id);
        before != self.selected_question_ids.len()
    }

    /// Flip membership of `id`. Returns `true` if it is selected afterwards.
    pub fn toggle(&mut self, id: QuestionId) -> bool {
        if self.remove(&id) {
            false
        } else {
            self.selected_question_ids.push(id);
            true
        }
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = QuestionId>) {
        for id in ids {
            self.insert(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected_question_ids.clear();
    }
}

fn dedup_ids<'de, D>(deserializer: D) -> Result<Vec<QuestionId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<QuestionId>::deserialize(deserializer)?;
    Ok(CustomSelection::from_ids(raw).selected_question_ids)
}
