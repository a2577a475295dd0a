use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use assess_core::model::{Question, QuestionId};

/// Errors surfaced by question stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Fetch contract the delivery engine consumes.
///
/// The returned list carries no ordering guarantee and may be incomplete;
/// the engine re-sequences against the requested ids and treats any missing
/// question as a blocking fetch failure.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Fetch questions by id set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backing store is unreachable.
    async fn get_questions_by_ids(
        &self,
        ids: &[QuestionId],
    ) -> Result<Vec<Question>, StorageError>;
}

/// Simple in-memory question bank for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryQuestionBank {
    questions: Arc<Mutex<HashMap<QuestionId, Question>>>,
}

impl InMemoryQuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add or replace a question in the bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the bank lock is poisoned.
    pub fn insert(&self, question: Question) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(question.id(), question);
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionBank {
    async fn get_questions_by_ids(
        &self,
        ids: &[QuestionId],
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        // Walk the map, not the request: the contract deliberately returns
        // hits in whatever order the bank yields, and skips unknown ids.
        let wanted: Vec<&Question> = guard.values().filter(|q| ids.contains(&q.id())).collect();
        Ok(wanted.into_iter().cloned().collect())
    }
}
