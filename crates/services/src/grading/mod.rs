mod auto;
mod http;

use async_trait::async_trait;
use serde::Serialize;

use assess_core::model::{AnswerSheet, AssessmentId, AttemptId, DeliveryMode, Grade};

use crate::error::GradingError;

pub use auto::AutoGrader;
pub use http::{GradingConfig, HttpGradingClient};

/// Identity of the attempt being graded.
///
/// The delivery mode is part of the identity because the surrounding app
/// exposes grading under two routing names (quiz vs. formal examination);
/// the operation behind them is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionIdentity {
    pub assessment_id: AssessmentId,
    pub attempt_id: AttemptId,
    pub mode: DeliveryMode,
}

/// Grading contract the delivery engine consumes.
///
/// Called at most once per attempt; the submission controller guarantees it.
#[async_trait]
pub trait GradingService: Send + Sync {
    /// Submit captured answers for grading.
    ///
    /// # Errors
    ///
    /// Returns `GradingError` when the backend rejects the submission or the
    /// transport fails; the attempt stays open for retry.
    async fn submit(
        &self,
        identity: &SubmissionIdentity,
        answers: &AnswerSheet,
    ) -> Result<Grade, GradingError>;
}
