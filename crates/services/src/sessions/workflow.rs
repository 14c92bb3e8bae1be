use chrono::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use quiz_core::model::{Question, QuizMode};

use super::builder::SessionBuilder;
use super::service::{QuizResult, QuizSession, SessionStep};
use super::ticker::{ElapsedTicker, TICK_PERIOD};
use super::view::{QuestionView, QuizView};
use crate::Clock;
use crate::error::SessionError;

/// Lifecycle of the quiz screen.
#[derive(Debug)]
pub enum QuizState {
    /// Mode selection; no session exists.
    Idle,
    Loading { mode: QuizMode },
    /// The build came back empty. Distinct from a finished quiz.
    NoQuestions { mode: QuizMode },
    /// A session exists; it may already be complete.
    InProgress(QuizSession),
}

/// Handle for one pending load. Stale tickets are ignored on delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    mode: QuizMode,
}

impl LoadTicket {
    #[must_use]
    pub fn mode(&self) -> &QuizMode {
        &self.mode
    }
}

/// Drives quiz sessions in response to discrete user events.
///
/// Each call runs to completion before the next one, so no locking is
/// involved. The only background work is the elapsed-time ticker.
pub struct QuizController {
    clock: Clock,
    builder: SessionBuilder,
    state: QuizState,
    generation: u64,
    ticker: Option<ElapsedTicker>,
}

impl QuizController {
    #[must_use]
    pub fn new(clock: Clock, builder: SessionBuilder) -> Self {
        Self {
            clock,
            builder,
            state: QuizState::Idle,
            generation: 0,
            ticker: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.state {
            QuizState::InProgress(session) => Some(session),
            _ => None,
        }
    }

    /// Build the working set for `mode` and install a fresh session.
    pub async fn start_session(&mut self, mode: QuizMode) -> &QuizState {
        let ticket = self.begin_loading(mode);
        let questions = self.builder.build(ticket.mode()).await;
        self.finish_loading(ticket, questions);
        &self.state
    }

    /// Enter `Loading` for `mode`, discarding any current session.
    pub fn begin_loading(&mut self, mode: QuizMode) -> LoadTicket {
        self.stop_ticker();
        self.generation += 1;
        debug!(generation = self.generation, scope = ?mode.scope, "loading quiz");
        self.state = QuizState::Loading { mode: mode.clone() };
        LoadTicket {
            generation: self.generation,
            mode,
        }
    }

    /// Deliver the questions of a load. Returns `false` if the user navigated
    /// away in the meantime, in which case nothing changes.
    pub fn finish_loading(&mut self, ticket: LoadTicket, questions: Vec<Question>) -> bool {
        if ticket.generation != self.generation || !matches!(self.state, QuizState::Loading { .. })
        {
            debug!(generation = ticket.generation, "discarding stale load");
            return false;
        }

        let started_at = self.clock.now();
        self.state = match QuizSession::start(ticket.mode.clone(), questions, started_at) {
            Ok(session) => {
                self.ticker = ElapsedTicker::spawn(self.clock, started_at, TICK_PERIOD);
                QuizState::InProgress(session)
            }
            Err(_) => {
                info!(scope = ?ticket.mode.scope, "no questions found for quiz");
                QuizState::NoQuestions { mode: ticket.mode }
            }
        };
        true
    }

    /// Select an answer by display position.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` without an active session, or the
    /// session's rejection.
    pub fn select_displayed(&mut self, position: usize) -> Result<(), SessionError> {
        self.active_session_mut()?.select_displayed(position)
    }

    /// Submit an answer given by its original index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` without an active session, or the
    /// session's rejection.
    pub fn submit_answer(&mut self, original_index: usize) -> Result<&QuizResult, SessionError> {
        self.active_session_mut()?.submit_answer(original_index)
    }

    /// Submit the current selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSelection` if nothing is selected.
    pub fn submit_selected(&mut self) -> Result<&QuizResult, SessionError> {
        self.active_session_mut()?.submit_selected()
    }

    /// Move past the feedback of the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AwaitingSubmission` before an answer is given.
    pub fn continue_to_next(&mut self) -> Result<SessionStep, SessionError> {
        let now = self.clock.now();
        let step = self.active_session_mut()?.continue_to_next(now)?;
        if step == SessionStep::Completed {
            self.stop_ticker();
        }
        Ok(step)
    }

    /// Drop the session (or pending load) and return to mode selection.
    pub fn back_to_mode_selection(&mut self) {
        self.stop_ticker();
        self.generation += 1;
        self.state = QuizState::Idle;
        debug!("returned to mode selection");
    }

    /// Ticker output for live elapsed-time display, while a quiz runs.
    #[must_use]
    pub fn subscribe_elapsed(&self) -> Option<watch::Receiver<Duration>> {
        self.ticker.as_ref().map(ElapsedTicker::subscribe)
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(ElapsedTicker::is_running)
    }

    /// Project the current state for rendering.
    #[must_use]
    pub fn view(&self) -> QuizView<'_> {
        let catalog = self.builder.catalog();
        let sample = self.builder.random_sample_size();
        match &self.state {
            QuizState::Idle => QuizView::ModeSelection,
            QuizState::Loading { mode } => QuizView::Loading {
                title: mode.title(catalog, sample),
            },
            QuizState::NoQuestions { mode } => QuizView::NoQuestions {
                title: mode.title(catalog, sample),
            },
            QuizState::InProgress(session) => {
                let title = session.mode().title(catalog, sample);
                if let Some(summary) = session.summary() {
                    return QuizView::Completed {
                        title,
                        summary,
                        show_final_score_banner: session.mode().is_random(),
                    };
                }
                match session.current_question() {
                    Some(question) => QuizView::Question(QuestionView {
                        title,
                        question,
                        answers: session.presented_answers(),
                        selected: session.selected_answer(),
                        feedback: session.feedback(),
                        progress: session.progress(),
                        progress_fraction: session.progress_fraction(),
                        score_percentage: session.score_percentage(),
                        show_running_score: !session.mode().is_random(),
                        is_last_question: session.is_last_question(),
                        elapsed: session.elapsed(self.clock.now()),
                    }),
                    None => QuizView::NoQuestions { title },
                }
            }
        }
    }

    fn active_session_mut(&mut self) -> Result<&mut QuizSession, SessionError> {
        match &mut self.state {
            QuizState::InProgress(session) => Ok(session),
            _ => Err(SessionError::NotInProgress),
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }
}
