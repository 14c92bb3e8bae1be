#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod preference_service;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, PreferenceServiceError, SessionError};
pub use preference_service::PreferenceService;

pub use sessions::{
    QuizController, QuizSession, QuizState, QuizSummary, QuizView, SessionBuilder, SessionStep,
};
