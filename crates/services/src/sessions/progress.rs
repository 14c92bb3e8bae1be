/// Aggregated view of quiz progress, useful for UI.
///
/// `total` counts queue entries, so it grows when a wrong answer is re-queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub is_complete: bool,
}
