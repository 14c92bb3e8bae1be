mod builder;
mod progress;
mod service;
mod shuffle;
mod ticker;
mod view;
mod workflow;

// Public API of the quiz session subsystem.
pub use crate::error::SessionError;
pub use builder::SessionBuilder;
pub use progress::QuizProgress;
pub use service::{QuestionPhase, QuizResult, QuizSession, SessionStep, score_percentage};
pub use shuffle::{answer_order, shuffled, shuffled_with};
pub use ticker::{ElapsedTicker, TICK_PERIOD};
pub use view::{
    AnswerMark, PASS_THRESHOLD_PERCENT, PresentedAnswer, QuestionView, QuizSummary, QuizView,
    format_elapsed,
};
pub use workflow::{LoadTicket, QuizController, QuizState};
