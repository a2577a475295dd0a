#![forbid(unsafe_code)]

pub mod repository;

pub use repository::{InMemoryQuestionBank, QuestionStore, StorageError};
