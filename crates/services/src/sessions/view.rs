use chrono::Duration;

use quiz_core::model::Question;

use super::progress::QuizProgress;
use super::service::score_percentage;

/// Score at or above which a finished quiz counts as passed.
pub const PASS_THRESHOLD_PERCENT: u32 = 70;

/// One answer option as it appears on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentedAnswer<'a> {
    pub position: usize,
    pub original_index: usize,
    pub text: &'a str,
}

/// Feedback marker for a displayed answer after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMark {
    Correct,
    ChosenWrong,
    Neutral,
}

impl AnswerMark {
    #[must_use]
    pub fn for_answer(question: &Question, index: usize, chosen: usize) -> Self {
        if question.is_correct(index) {
            Self::Correct
        } else if index == chosen {
            Self::ChosenWrong
        } else {
            Self::Neutral
        }
    }
}

/// Final figures of a completed quiz.
///
/// `attempts` counts submissions, including repeats of re-queued questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub correct: usize,
    pub attempts: usize,
    pub wrong: usize,
    pub score_percentage: u32,
    pub passed: bool,
    pub total_time: Duration,
}

impl QuizSummary {
    #[must_use]
    pub fn new(correct: usize, attempts: usize, wrong: usize, total_time: Duration) -> Self {
        let score_percentage = score_percentage(correct, attempts);
        Self {
            correct,
            attempts,
            wrong,
            score_percentage,
            passed: score_percentage >= PASS_THRESHOLD_PERCENT,
            total_time,
        }
    }
}

/// State of the current question, shaped for a presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView<'a> {
    pub title: String,
    pub question: &'a Question,
    pub answers: Vec<PresentedAnswer<'a>>,
    pub selected: Option<usize>,
    pub feedback: Option<Vec<AnswerMark>>,
    pub progress: QuizProgress,
    pub progress_fraction: f64,
    pub score_percentage: u32,
    /// Running score is hidden in random quizzes.
    pub show_running_score: bool,
    pub is_last_question: bool,
    pub elapsed: Duration,
}

/// Everything the presentation layer renders, one variant per screen.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizView<'a> {
    ModeSelection,
    Loading { title: String },
    NoQuestions { title: String },
    Question(QuestionView<'a>),
    Completed { title: String, summary: QuizSummary, show_final_score_banner: bool },
}

/// Formats a duration as `mm:ss`, or `h:mm:ss` past an hour.
#[must_use]
pub fn format_elapsed(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
