#![forbid(unsafe_code)]

pub mod json;
pub mod repository;
pub mod sqlite;

pub use json::JsonQuestionProvider;
pub use repository::{
    InMemoryPreferences, InMemoryQuestionBank, PreferenceRepository, QuestionProvider,
    QuestionRecord, Storage, StorageError,
};
