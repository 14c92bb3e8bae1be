mod ids;
mod mode;
mod question;
mod selection;

pub use ids::QuestionId;
pub use mode::{QuizMode, QuizScope, RANDOM_QUIZ_SIZE};
pub use question::{Question, QuestionError};
pub use selection::CustomSelection;
