use chrono::{DateTime, Duration, Utc};
use std::fmt;
use tracing::{debug, info};

use quiz_core::model::{Question, QuizMode};

use super::progress::QuizProgress;
use super::shuffle::answer_order;
use super::view::{AnswerMark, PresentedAnswer, QuizSummary};
use crate::error::SessionError;

//
// ─── RESULT ENTRIES ────────────────────────────────────────────────────────────
//

/// One submission for one occurrence of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    /// Position in the queue of the occurrence that was answered.
    pub question_index: usize,
    /// Chosen answer as an index into the question's original answers.
    pub chosen_answer: usize,
    pub is_correct: bool,
    pub question: Question,
}

/// Where the current question stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionPhase {
    AwaitingAnswer { selected: Option<usize> },
    ShowingFeedback { chosen: usize, is_correct: bool },
}

/// Outcome of `continue_to_next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Next,
    Completed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session.
///
/// Steps through a queue of questions one answer at a time. A wrong answer
/// puts the question back at the end of the queue (except in random quizzes),
/// so the queue only ever grows and the session ends once every occurrence
/// has been answered.
pub struct QuizSession {
    mode: QuizMode,
    queue: Vec<Question>,
    current: usize,
    phase: QuestionPhase,
    answer_order: Vec<usize>,
    results: Vec<QuizResult>,
    wrong_answers: Vec<Question>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session over a built working set.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn start(
        mode: QuizMode,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let Some(first) = questions.first() else {
            return Err(SessionError::Empty);
        };
        let answer_order = answer_order(first, mode.randomize_answers);

        info!(
            count = questions.len(),
            randomize_answers = mode.randomize_answers,
            "quiz session started"
        );

        Ok(Self {
            mode,
            queue: questions,
            current: 0,
            phase: QuestionPhase::AwaitingAnswer { selected: None },
            answer_order,
            results: Vec::new(),
            wrong_answers: Vec::new(),
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn mode(&self) -> &QuizMode {
        &self.mode
    }

    #[must_use]
    pub fn queue(&self) -> &[Question] {
        &self.queue
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn phase(&self) -> QuestionPhase {
        self.phase
    }

    #[must_use]
    pub fn results(&self) -> &[QuizResult] {
        &self.results
    }

    #[must_use]
    pub fn wrong_answers(&self) -> &[Question] {
        &self.wrong_answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.queue.get(self.current)
    }

    /// Selected answer (original index) while awaiting submission.
    #[must_use]
    pub fn selected_answer(&self) -> Option<usize> {
        match self.phase {
            QuestionPhase::AwaitingAnswer { selected } if !self.is_complete() => selected,
            _ => None,
        }
    }

    /// True once the current occurrence has been answered.
    #[must_use]
    pub fn is_showing_feedback(&self) -> bool {
        !self.is_complete() && matches!(self.phase, QuestionPhase::ShowingFeedback { .. })
    }

    /// True when the current question is the last one in the queue.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        !self.is_complete() && self.current + 1 >= self.queue.len()
    }

    //
    // ─── TRANSITIONS ──────────────────────────────────────────────────────────
    //

    /// Choose an answer by its original index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed`, `SessionError::AlreadySubmitted` or
    /// `SessionError::AnswerOutOfRange`; the selection is unchanged then.
    pub fn select_answer(&mut self, original_index: usize) -> Result<(), SessionError> {
        let question = self.current_question().ok_or(SessionError::Completed)?;
        let len = question.answers().len();
        if original_index >= len {
            return Err(SessionError::AnswerOutOfRange {
                index: original_index,
                len,
            });
        }
        match self.phase {
            QuestionPhase::AwaitingAnswer { .. } => {
                self.phase = QuestionPhase::AwaitingAnswer {
                    selected: Some(original_index),
                };
                Ok(())
            }
            QuestionPhase::ShowingFeedback { .. } => Err(SessionError::AlreadySubmitted),
        }
    }

    /// Choose an answer by its position on screen.
    ///
    /// # Errors
    ///
    /// Same as `select_answer`.
    pub fn select_displayed(&mut self, position: usize) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let original = self
            .answer_order
            .get(position)
            .copied()
            .ok_or(SessionError::AnswerOutOfRange {
                index: position,
                len: self.answer_order.len(),
            })?;
        self.select_answer(original)
    }

    /// Grade the selected answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSelection` when nothing is selected, and the
    /// errors of `select_answer` for other rejected states.
    pub fn submit_selected(&mut self) -> Result<&QuizResult, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let phase = self.phase;
        match phase {
            QuestionPhase::AwaitingAnswer { selected: Some(chosen) } => Ok(self.grade(chosen)),
            QuestionPhase::AwaitingAnswer { selected: None } => Err(SessionError::NoSelection),
            QuestionPhase::ShowingFeedback { .. } => Err(SessionError::AlreadySubmitted),
        }
    }

    /// Select and grade an answer given by its original index.
    ///
    /// # Errors
    ///
    /// Same as `select_answer`.
    pub fn submit_answer(&mut self, original_index: usize) -> Result<&QuizResult, SessionError> {
        self.select_answer(original_index)?;
        self.submit_selected()
    }

    fn grade(&mut self, chosen: usize) -> &QuizResult {
        let question = self.queue[self.current].clone();
        let is_correct = question.is_correct(chosen);

        if !is_correct {
            if self.mode.requeues_wrong_answers() {
                self.queue.push(question.clone());
            }
            self.wrong_answers.push(question.clone());
        }

        debug!(
            index = self.current,
            chosen,
            is_correct,
            queue_len = self.queue.len(),
            "answer graded"
        );

        self.results.push(QuizResult {
            question_index: self.current,
            chosen_answer: chosen,
            is_correct,
            question,
        });
        self.phase = QuestionPhase::ShowingFeedback { chosen, is_correct };

        &self.results[self.results.len() - 1]
    }

    /// Leave the feedback for the current question and move on.
    ///
    /// `now` stamps the completion time when the queue is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AwaitingSubmission` before the current question
    /// is answered, or `SessionError::Completed` once the session is over.
    pub fn continue_to_next(&mut self, now: DateTime<Utc>) -> Result<SessionStep, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if let QuestionPhase::AwaitingAnswer { .. } = self.phase {
            return Err(SessionError::AwaitingSubmission);
        }

        let next = self.current + 1;
        if next >= self.queue.len() {
            self.completed_at = Some(now.max(self.started_at));
            info!(
                attempts = self.results.len(),
                correct = self.correct_count(),
                score = self.score_percentage(),
                "quiz session completed"
            );
            return Ok(SessionStep::Completed);
        }

        self.current = next;
        self.phase = QuestionPhase::AwaitingAnswer { selected: None };
        self.answer_order = answer_order(&self.queue[next], self.mode.randomize_answers);
        Ok(SessionStep::Next)
    }

    //
    // ─── PROJECTIONS ──────────────────────────────────────────────────────────
    //

    /// Answers of the current question in display order.
    #[must_use]
    pub fn presented_answers(&self) -> Vec<PresentedAnswer<'_>> {
        let Some(question) = self.current_question() else {
            return Vec::new();
        };
        self.answer_order
            .iter()
            .enumerate()
            .filter_map(|(position, &original_index)| {
                question.answer(original_index).map(|text| PresentedAnswer {
                    position,
                    original_index,
                    text,
                })
            })
            .collect()
    }

    /// Display order of the current question's answers, as original indices.
    #[must_use]
    pub fn answer_display_order(&self) -> &[usize] {
        if self.is_complete() {
            return &[];
        }
        &self.answer_order
    }

    /// Marks per displayed answer once the current question is answered.
    #[must_use]
    pub fn feedback(&self) -> Option<Vec<AnswerMark>> {
        let QuestionPhase::ShowingFeedback { chosen, .. } = self.phase else {
            return None;
        };
        let question = self.current_question()?;
        Some(
            self.answer_order
                .iter()
                .map(|&index| AnswerMark::for_answer(question, index, chosen))
                .collect(),
        )
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_correct).count()
    }

    /// Rounded percentage of correct attempts; 0 before the first attempt.
    #[must_use]
    pub fn score_percentage(&self) -> u32 {
        score_percentage(self.correct_count(), self.results.len())
    }

    /// `(current_index + 1) / queue_len`, or 1.0 once completed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        if self.is_complete() {
            return 1.0;
        }
        (self.current + 1) as f64 / self.queue.len() as f64
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            position: (self.current + 1).min(self.queue.len()),
            total: self.queue.len(),
            answered: self.results.len(),
            correct: self.correct_count(),
            is_complete: self.is_complete(),
        }
    }

    /// Running time while in progress, frozen at the total once completed.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let end = self.completed_at.unwrap_or(now);
        (end - self.started_at).max(Duration::zero())
    }

    #[must_use]
    pub fn total_time(&self) -> Option<Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }

    /// Final figures, available once the session is complete.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        let total_time = self.total_time()?;
        Some(QuizSummary::new(
            self.correct_count(),
            self.results.len(),
            self.wrong_answers.len(),
            total_time,
        ))
    }
}

/// `round(100 * correct / attempts)`, defined as 0 without attempts.
#[must_use]
pub fn score_percentage(correct: usize, attempts: usize) -> u32 {
    if attempts == 0 {
        return 0;
    }
    let rounded = (200 * correct + attempts) / (2 * attempts);
    u32::try_from(rounded).unwrap_or(100)
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("mode", &self.mode)
            .field("queue_len", &self.queue.len())
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("results_len", &self.results.len())
            .field("wrong_len", &self.wrong_answers.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn question(prompt: &str, correct: usize) -> Question {
        let answers = ["a", "b", "c", "d"].iter().map(|s| (*s).to_string()).collect();
        Question::new(prompt, answers, correct).unwrap()
    }

    fn questions(n: usize) -> Vec<Question> {
        (0..n).map(|i| question(&format!("Q{i}"), i % 4)).collect()
    }

    fn wrong_for(q: &Question) -> usize {
        (q.correct_answer() + 1) % q.answers().len()
    }

    fn answer_current(session: &mut QuizSession, correct: bool) -> SessionStep {
        let q = session.current_question().unwrap().clone();
        let pick = if correct { q.correct_answer() } else { wrong_for(&q) };
        session.submit_answer(pick).unwrap();
        session.continue_to_next(fixed_now()).unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::start(QuizMode::all(), Vec::new(), fixed_now()).unwrap_err();
        assert_eq!(err, SessionError::Empty);
    }

    #[test]
    fn subject_scenario_requeues_wrong_answer() {
        let mut session =
            QuizSession::start(QuizMode::subject("x"), questions(3), fixed_now()).unwrap();

        answer_current(&mut session, true);
        let wrong = session.current_question().unwrap().clone();
        answer_current(&mut session, false);
        assert_eq!(session.queue().len(), 4);
        assert_eq!(session.queue()[3], wrong);
        answer_current(&mut session, true);
        assert!(!session.is_complete());

        assert_eq!(session.current_question(), Some(&wrong));
        assert_eq!(answer_current(&mut session, true), SessionStep::Completed);

        assert!(session.is_complete());
        assert_eq!(session.results().len(), 4);
        assert_eq!(session.correct_count(), 3);
        assert_eq!(session.score_percentage(), 75);
        assert_eq!(session.wrong_answers(), &[wrong]);
    }

    #[test]
    fn repeated_mistakes_requeue_each_time() {
        let mut session =
            QuizSession::start(QuizMode::all(), questions(1), fixed_now()).unwrap();

        answer_current(&mut session, false);
        answer_current(&mut session, false);
        assert_eq!(session.queue().len(), 3);
        assert_eq!(answer_current(&mut session, true), SessionStep::Completed);
        assert_eq!(session.wrong_answers().len(), 2);
        assert_eq!(session.results().len(), 3);
        assert_eq!(session.score_percentage(), 33);
    }

    #[test]
    fn random_mode_never_requeues() {
        let mut session =
            QuizSession::start(QuizMode::random(), questions(36), fixed_now()).unwrap();

        let mut steps = 0;
        loop {
            steps += 1;
            assert_eq!(session.queue().len(), 36);
            if answer_current(&mut session, false) == SessionStep::Completed {
                break;
            }
        }

        assert_eq!(steps, 36);
        assert_eq!(session.queue().len(), 36);
        assert_eq!(session.score_percentage(), 0);
        assert_eq!(session.wrong_answers().len(), 36);
    }

    #[test]
    fn submit_without_selection_is_rejected() {
        let mut session =
            QuizSession::start(QuizMode::all(), questions(2), fixed_now()).unwrap();

        assert_eq!(
            session.submit_selected().unwrap_err(),
            SessionError::NoSelection
        );
        assert!(session.results().is_empty());
        assert_eq!(session.selected_answer(), None);
    }

    #[test]
    fn continue_before_submit_is_rejected() {
        let mut session =
            QuizSession::start(QuizMode::all(), questions(2), fixed_now()).unwrap();
        session.select_answer(1).unwrap();

        assert_eq!(
            session.continue_to_next(fixed_now()).unwrap_err(),
            SessionError::AwaitingSubmission
        );
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.selected_answer(), Some(1));
    }

    #[test]
    fn out_of_range_and_double_submit_are_rejected() {
        let mut session =
            QuizSession::start(QuizMode::all(), questions(2), fixed_now()).unwrap();

        assert_eq!(
            session.select_answer(4).unwrap_err(),
            SessionError::AnswerOutOfRange { index: 4, len: 4 }
        );
        session.submit_answer(0).unwrap();
        assert_eq!(
            session.submit_answer(1).unwrap_err(),
            SessionError::AlreadySubmitted
        );
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn completed_session_rejects_everything() {
        let mut session =
            QuizSession::start(QuizMode::all(), questions(1), fixed_now()).unwrap();
        answer_current(&mut session, true);

        assert_eq!(session.select_answer(0).unwrap_err(), SessionError::Completed);
        assert_eq!(session.submit_selected().unwrap_err(), SessionError::Completed);
        assert_eq!(
            session.continue_to_next(fixed_now()).unwrap_err(),
            SessionError::Completed
        );
        assert!(session.current_question().is_none());
        assert!(session.presented_answers().is_empty());
    }

    #[test]
    fn grading_ignores_display_order() {
        for randomize in [false, true] {
            let mode = QuizMode::all().with_randomized_answers(randomize);
            let mut session = QuizSession::start(mode, vec![question("Q", 2)], fixed_now()).unwrap();

            let position = session
                .presented_answers()
                .iter()
                .find(|a| a.original_index == 2)
                .map(|a| a.position)
                .unwrap();
            session.select_displayed(position).unwrap();
            let result = session.submit_selected().unwrap();
            assert!(result.is_correct);
            assert_eq!(result.chosen_answer, 2);
        }
    }

    #[test]
    fn presented_answers_are_a_permutation() {
        let mode = QuizMode::all().with_randomized_answers(true);
        let mut session = QuizSession::start(mode, questions(5), fixed_now()).unwrap();
        while !session.is_complete() {
            let mut order: Vec<_> = session
                .presented_answers()
                .iter()
                .map(|a| a.original_index)
                .collect();
            order.sort_unstable();
            assert_eq!(order, vec![0, 1, 2, 3]);
            answer_current(&mut session, true);
        }
    }

    #[test]
    fn requeued_question_gets_a_fresh_shuffle() {
        let answers: Vec<String> = (0..6).map(|i| format!("option {i}")).collect();
        let q = Question::new("Q", answers, 0).unwrap();
        let mode = QuizMode::subject("x").with_randomized_answers(true);

        let mut reshuffled = false;
        for _ in 0..50 {
            let mut session = QuizSession::start(mode.clone(), vec![q.clone()], fixed_now()).unwrap();
            let first = session.answer_display_order().to_vec();
            assert_eq!(answer_current(&mut session, false), SessionStep::Next);
            assert_eq!(session.current_question(), Some(&q));

            let again = session.answer_display_order().to_vec();
            let mut sorted = again.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..6).collect::<Vec<_>>());
            reshuffled |= first != again;
        }
        assert!(reshuffled);
    }

    #[test]
    fn feedback_marks_correct_and_chosen() {
        let mut session =
            QuizSession::start(QuizMode::all(), vec![question("Q", 1)], fixed_now()).unwrap();
        assert!(session.feedback().is_none());

        session.submit_answer(3).unwrap();
        let marks = session.feedback().unwrap();
        assert_eq!(
            marks,
            vec![
                AnswerMark::Neutral,
                AnswerMark::Correct,
                AnswerMark::Neutral,
                AnswerMark::ChosenWrong
            ]
        );
    }

    #[test]
    fn timing_freezes_on_completion() {
        let start = fixed_now();
        let mut session = QuizSession::start(QuizMode::all(), questions(1), start).unwrap();
        assert_eq!(session.elapsed(start + Duration::seconds(30)), Duration::seconds(30));
        assert_eq!(session.total_time(), None);

        session.submit_answer(0).unwrap();
        session
            .continue_to_next(start + Duration::seconds(42))
            .unwrap();

        assert_eq!(session.total_time(), Some(Duration::seconds(42)));
        assert_eq!(
            session.elapsed(start + Duration::hours(2)),
            Duration::seconds(42)
        );
        let summary = session.summary().unwrap();
        assert_eq!(summary.total_time, Duration::seconds(42));
        assert!(summary.passed);
    }

    #[test]
    fn progress_tracks_queue_growth() {
        let mut session =
            QuizSession::start(QuizMode::all(), questions(2), fixed_now()).unwrap();
        assert!((session.progress_fraction() - 0.5).abs() < f64::EPSILON);
        assert!(!session.is_last_question());

        answer_current(&mut session, false);
        let progress = session.progress();
        assert_eq!(progress.position, 2);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.correct, 0);
    }

    #[test]
    fn score_rounds_half_up_and_handles_zero() {
        assert_eq!(score_percentage(0, 0), 0);
        assert_eq!(score_percentage(1, 8), 13);
        assert_eq!(score_percentage(2, 3), 67);
        assert_eq!(score_percentage(1, 200), 1);
        assert_eq!(score_percentage(5, 5), 100);
    }
}
