use assess_core::model::{Grade, Question};

use super::service::{AssessmentSession, SessionPhase};

/// Point-in-time copy of everything the hosting view renders.
///
/// Snapshots are cheap, owned values: the view takes a fresh one per render
/// instead of holding the session lock.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_question: Option<Question>,
    pub current_index: usize,
    pub total_questions: usize,
    pub answered: usize,
    pub remaining_seconds: Option<u32>,
    pub remaining_display: Option<String>,
    pub grade: Option<Grade>,
    pub submission_error: Option<String>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn of(session: &AssessmentSession) -> Self {
        Self {
            phase: session.phase(),
            current_question: session.current_question().cloned(),
            current_index: session.current_index(),
            total_questions: session.total_questions(),
            answered: session.answers().len(),
            remaining_seconds: session.remaining_seconds(),
            remaining_display: session.remaining_seconds().map(format_remaining),
            grade: session.grade().cloned(),
            submission_error: session.submission_error().map(str::to_owned),
        }
    }
}

/// Clock-face rendering of the countdown: mm:ss, widening to h:mm:ss once
/// an hour or more is left.
#[must_use]
pub fn format_remaining(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
