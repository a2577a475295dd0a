use serde::{Deserialize, Serialize};

/// Whether a grade is final or waiting on instructor review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeStatus {
    Graded,
    PendingReview,
}

/// Outcome returned by the grading service for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    score: Option<f64>,
    status: GradeStatus,
}

impl Grade {
    /// A final auto-computed score.
    #[must_use]
    pub fn graded(score: f64) -> Self {
        Self {
            score: Some(score),
            status: GradeStatus::Graded,
        }
    }

    /// A grade held back for manual review; no score yet.
    #[must_use]
    pub fn pending_review() -> Self {
        Self {
            score: None,
            status: GradeStatus::PendingReview,
        }
    }

    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    #[must_use]
    pub fn status(&self) -> GradeStatus {
        self.status
    }

    #[must_use]
    pub fn is_final(&self) -> bool {
        self.status == GradeStatus::Graded
    }
}
