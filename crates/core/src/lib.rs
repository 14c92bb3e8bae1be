#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod time;

pub use catalog::{ModuleInfo, Subject, SubjectCatalog};
pub use time::Clock;
