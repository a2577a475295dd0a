use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{AssessmentId, QuestionId};

//
// ─── DELIVERY MODE ─────────────────────────────────────────────────────────────
//

/// How an assessment is delivered.
///
/// Quiz taking and formal exam taking share one engine; the mode carries the
/// only two behaviors that differ: forward-navigation gating and the
/// routing name the grading endpoint is exposed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Quiz,
    Exam,
}

impl DeliveryMode {
    /// Whether moving forward requires the current question to be answered.
    #[must_use]
    pub fn gates_navigation(self) -> bool {
        matches!(self, DeliveryMode::Quiz)
    }

    /// Path segment the grading endpoint routes this mode under.
    #[must_use]
    pub fn routing_key(self) -> &'static str {
        match self {
            DeliveryMode::Quiz => "quizzes",
            DeliveryMode::Exam => "exams",
        }
    }
}

//
// ─── ASSESSMENT DEFINITION ─────────────────────────────────────────────────────
//

/// Authored configuration of one assessment: the ordered question id list
/// plus delivery options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentDefinition {
    id: AssessmentId,
    mode: DeliveryMode,
    question_ids: Vec<QuestionId>,
    time_limit_minutes: Option<u32>,
    randomize: bool,
    attempt_limit: Option<u32>,
}

impl AssessmentDefinition {
    /// Create a definition with no time limit, no shuffling, and no attempt cap.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::DuplicateQuestionId` if an id appears twice.
    pub fn new(
        id: AssessmentId,
        mode: DeliveryMode,
        question_ids: Vec<QuestionId>,
    ) -> Result<Self, DefinitionError> {
        let mut seen = HashSet::with_capacity(question_ids.len());
        for question_id in &question_ids {
            if !seen.insert(*question_id) {
                return Err(DefinitionError::DuplicateQuestionId(*question_id));
            }
        }

        Ok(Self {
            id,
            mode,
            question_ids,
            time_limit_minutes: None,
            randomize: false,
            attempt_limit: None,
        })
    }

    /// Set a wall-clock time limit in minutes.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::ZeroTimeLimit` for a zero-minute limit.
    pub fn with_time_limit(mut self, minutes: u32) -> Result<Self, DefinitionError> {
        if minutes == 0 {
            return Err(DefinitionError::ZeroTimeLimit);
        }
        self.time_limit_minutes = Some(minutes);
        Ok(self)
    }

    /// Enable or disable randomized question order for each attempt.
    #[must_use]
    pub fn with_randomized_order(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    /// Cap how many attempts a learner may take. Quiz only.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::AttemptLimitOnExam` for exam definitions and
    /// `DefinitionError::ZeroAttemptLimit` for a zero cap.
    pub fn with_attempt_limit(mut self, attempts: u32) -> Result<Self, DefinitionError> {
        if self.mode == DeliveryMode::Exam {
            return Err(DefinitionError::AttemptLimitOnExam);
        }
        if attempts == 0 {
            return Err(DefinitionError::ZeroAttemptLimit);
        }
        self.attempt_limit = Some(attempts);
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> AssessmentId {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    #[must_use]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> Option<u32> {
        self.time_limit_minutes
    }

    /// The time limit expressed in countdown seconds.
    #[must_use]
    pub fn time_limit_seconds(&self) -> Option<u32> {
        self.time_limit_minutes.map(|minutes| minutes * 60)
    }

    #[must_use]
    pub fn randomize(&self) -> bool {
        self.randomize
    }

    #[must_use]
    pub fn attempt_limit(&self) -> Option<u32> {
        self.attempt_limit
    }

    /// Whether the definition has no questions and can never start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }
}

//
// ─── DEFINITION VALIDATION ERRORS ──────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DefinitionError {
    #[error("question {0} appears more than once")]
    DuplicateQuestionId(QuestionId),

    #[error("time limit must be at least one minute")]
    ZeroTimeLimit,

    #[error("attempt limit must be at least one")]
    ZeroAttemptLimit,

    #[error("attempt limits apply to quizzes only")]
    AttemptLimitOnExam,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
