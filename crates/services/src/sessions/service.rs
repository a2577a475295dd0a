use chrono::{DateTime, Utc};
use std::fmt;

use assess_core::model::{
    AnswerSheet, AnswerValue, AssessmentDefinition, AttemptId, Grade, Question, QuestionId,
};

use super::progress::SessionProgress;
use super::submission::{SubmissionController, SubmissionPhase, SubmitTrigger};
use crate::countdown::CountdownTimer;

//
// ─── SESSION PHASE ─────────────────────────────────────────────────────────────
//

/// Session state as the hosting view sees it.
///
/// `NotReady` is terminal: a definition with no questions never starts a
/// timer and can never be submitted. The remaining values mirror the
/// submission controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotReady,
    NotStarted,
    InProgress,
    Submitting,
    Submitted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Runtime state of one attempt, owned by the hosting view for the
/// attempt's lifetime.
///
/// Created on entry to the assessment view, discarded on completion or
/// navigation away; nothing persists across sessions, so a reload starts a
/// fresh attempt.
pub struct AssessmentSession {
    definition: AssessmentDefinition,
    attempt_id: AttemptId,
    questions: Vec<Question>,
    answers: AnswerSheet,
    current: usize,
    remaining_seconds: Option<u32>,
    controller: SubmissionController,
    timer: Option<CountdownTimer>,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    submission_error: Option<String>,
}

impl AssessmentSession {
    /// Create a session over an already materialized question list.
    ///
    /// The list must be re-sequenced (and shuffled, if requested) by the
    /// orchestrating service before it gets here; an empty list produces a
    /// terminal `NotReady` session.
    #[must_use]
    pub fn new(
        definition: AssessmentDefinition,
        questions: Vec<Question>,
        attempt_id: AttemptId,
        started_at: DateTime<Utc>,
    ) -> Self {
        let remaining_seconds = if questions.is_empty() {
            None
        } else {
            definition.time_limit_seconds()
        };

        Self {
            definition,
            attempt_id,
            questions,
            answers: AnswerSheet::new(),
            current: 0,
            remaining_seconds,
            controller: SubmissionController::new(),
            timer: None,
            started_at,
            submitted_at: None,
            submission_error: None,
        }
    }

    /// Open the attempt. A `NotReady` session stays terminal.
    pub fn begin(&mut self) -> bool {
        if self.questions.is_empty() {
            return false;
        }
        self.controller.start()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.questions.is_empty() {
            return SessionPhase::NotReady;
        }
        match self.controller.phase() {
            SubmissionPhase::NotStarted => SessionPhase::NotStarted,
            SubmissionPhase::InProgress => SessionPhase::InProgress,
            SubmissionPhase::Submitting => SessionPhase::Submitting,
            SubmissionPhase::Submitted => SessionPhase::Submitted,
        }
    }

    #[must_use]
    pub fn definition(&self) -> &AssessmentDefinition {
        &self.definition
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.answers.is_answered(id)
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_seconds
    }

    #[must_use]
    pub fn grade(&self) -> Option<&Grade> {
        self.controller.grade()
    }

    /// Message from the last failed submission, until a retry clears it.
    #[must_use]
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let answered = self.answers.len();
        SessionProgress {
            total,
            answered,
            unanswered: total.saturating_sub(answered),
            is_submitted: self.controller.phase() == SubmissionPhase::Submitted,
        }
    }

    //
    // ─── ANSWER CAPTURE ────────────────────────────────────────────────────
    //

    /// Capture an answer for a question on this session.
    ///
    /// The answers map is mutable only while the attempt is in progress.
    /// Outside that phase, and for unknown ids or mismatched shapes, the
    /// value is silently dropped.
    pub fn record_answer(&mut self, id: QuestionId, value: AnswerValue) -> bool {
        if !self.controller.is_in_progress() {
            return false;
        }
        let Some(question) = self.questions.iter().find(|q| q.id() == id) else {
            return false;
        };
        self.answers.record(question, value)
    }

    /// Flip one option of a multiple-select answer. Same gating as
    /// `record_answer`.
    pub fn toggle_selection(&mut self, id: QuestionId, index: usize) -> bool {
        if !self.controller.is_in_progress() {
            return false;
        }
        let Some(question) = self.questions.iter().find(|q| q.id() == id) else {
            return false;
        };
        self.answers.toggle_selection(question, index)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────
    //

    /// Move the current index by `delta`, clamped into bounds.
    ///
    /// Quiz mode gates forward movement on the current question being
    /// answered; exams navigate freely. Returns the index after the move.
    pub fn navigate(&mut self, delta: isize) -> usize {
        if self.questions.is_empty() || !self.controller.is_in_progress() {
            return self.current;
        }

        if delta > 0
            && self.definition.mode().gates_navigation()
            && !self
                .current_question()
                .is_some_and(|q| self.answers.is_answered(q.id()))
        {
            return self.current;
        }

        let last = self.questions.len() - 1;
        let target = self.current.saturating_add_signed(delta).min(last);
        self.current = target;
        self.current
    }

    //
    // ─── SUBMISSION PLUMBING ───────────────────────────────────────────────
    //

    pub(crate) fn attach_timer(&mut self, timer: CountdownTimer) {
        self.timer = Some(timer);
    }

    pub(crate) fn set_remaining(&mut self, seconds: u32) {
        self.remaining_seconds = Some(seconds);
    }

    /// Claim the single grading call. On success the timer is stopped and
    /// released so no stale tick can fire while grading is in flight.
    pub(crate) fn begin_submission(&mut self, trigger: SubmitTrigger) -> bool {
        if self.questions.is_empty() {
            return false;
        }
        if !self.controller.begin(trigger) {
            return false;
        }
        self.release_timer();
        self.submission_error = None;
        true
    }

    pub(crate) fn complete_submission(&mut self, grade: Grade, at: DateTime<Utc>) {
        self.controller.complete(grade);
        self.submitted_at = Some(at);
    }

    /// Roll back a failed submission: answers stay, the countdown stays
    /// stopped, and the error message is kept for the view until a retry.
    pub(crate) fn fail_submission(&mut self, message: String) {
        self.controller.fail();
        self.submission_error = Some(message);
    }

    fn release_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
    }
}

impl fmt::Debug for AssessmentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentSession")
            .field("assessment_id", &self.definition.id())
            .field("attempt_id", &self.attempt_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("remaining_seconds", &self.remaining_seconds)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{AssessmentId, DeliveryMode, QuestionBody};
    use assess_core::time::fixed_now;

    fn build_question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}?"),
            QuestionBody::MultipleChoice {
                options: vec!["A".into(), "B".into()],
                correct_option: 0,
            },
        )
        .unwrap()
    }

    fn build_session(mode: DeliveryMode, count: u64) -> AssessmentSession {
        let ids = (1..=count).map(QuestionId::new).collect();
        let definition = AssessmentDefinition::new(AssessmentId::new(1), mode, ids).unwrap();
        let questions = (1..=count).map(build_question).collect();
        let mut session =
            AssessmentSession::new(definition, questions, AttemptId::new(), fixed_now());
        session.begin();
        session
    }

    #[test]
    fn empty_definition_is_terminally_not_ready() {
        let definition =
            AssessmentDefinition::new(AssessmentId::new(1), DeliveryMode::Quiz, Vec::new())
                .unwrap();
        let mut session =
            AssessmentSession::new(definition, Vec::new(), AttemptId::new(), fixed_now());

        assert!(!session.begin());
        assert_eq!(session.phase(), SessionPhase::NotReady);
        assert!(!session.begin_submission(SubmitTrigger::Manual));
        assert_eq!(session.remaining_seconds(), None);
        assert_eq!(session.phase(), SessionPhase::NotReady);
    }

    #[test]
    fn navigation_clamps_to_bounds() {
        let mut session = build_session(DeliveryMode::Exam, 3);

        assert_eq!(session.navigate(-1), 0);
        assert_eq!(session.navigate(1), 1);
        assert_eq!(session.navigate(5), 2);
        assert_eq!(session.navigate(-10), 0);
    }

    #[test]
    fn quiz_gates_forward_navigation_on_answered() {
        let mut session = build_session(DeliveryMode::Quiz, 2);

        assert_eq!(session.navigate(1), 0);

        session.record_answer(QuestionId::new(1), AnswerValue::Choice(0));
        assert_eq!(session.navigate(1), 1);

        // Moving back never needs an answer.
        assert_eq!(session.navigate(-1), 0);
    }

    #[test]
    fn exam_navigates_freely() {
        let mut session = build_session(DeliveryMode::Exam, 2);
        assert_eq!(session.navigate(1), 1);
        assert_eq!(session.navigate(-1), 0);
    }

    #[test]
    fn answers_are_immutable_outside_in_progress() {
        let mut session = build_session(DeliveryMode::Exam, 2);
        assert!(session.begin_submission(SubmitTrigger::Manual));

        assert!(!session.record_answer(QuestionId::new(1), AnswerValue::Choice(0)));
        assert!(!session.toggle_selection(QuestionId::new(1), 0));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn record_answer_ignores_unknown_question() {
        let mut session = build_session(DeliveryMode::Exam, 2);
        assert!(!session.record_answer(QuestionId::new(99), AnswerValue::Choice(0)));
    }

    #[test]
    fn double_submission_claim_is_rejected() {
        let mut session = build_session(DeliveryMode::Exam, 1);

        assert!(session.begin_submission(SubmitTrigger::TimerExpiry));
        assert!(!session.begin_submission(SubmitTrigger::Manual));
        assert_eq!(session.phase(), SessionPhase::Submitting);
    }

    #[test]
    fn failed_submission_preserves_answers_and_allows_retry() {
        let mut session = build_session(DeliveryMode::Exam, 2);
        session.record_answer(QuestionId::new(1), AnswerValue::Choice(1));

        assert!(session.begin_submission(SubmitTrigger::Manual));
        session.fail_submission("grading unavailable".into());

        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.submission_error(), Some("grading unavailable"));
        assert_eq!(session.answers().len(), 1);

        assert!(session.begin_submission(SubmitTrigger::Manual));
        assert_eq!(session.submission_error(), None);
        session.complete_submission(Grade::graded(50.0), fixed_now());
        assert_eq!(session.phase(), SessionPhase::Submitted);
        assert_eq!(session.grade(), Some(&Grade::graded(50.0)));
        assert_eq!(session.submitted_at(), Some(fixed_now()));
    }

    #[test]
    fn progress_counts_answers() {
        let mut session = build_session(DeliveryMode::Exam, 3);
        session.record_answer(QuestionId::new(2), AnswerValue::Choice(0));

        let progress = session.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.unanswered, 2);
        assert!(!progress.is_submitted);
    }

    #[test]
    fn navigation_is_frozen_after_submission() {
        let mut session = build_session(DeliveryMode::Exam, 3);
        session.navigate(1);
        session.begin_submission(SubmitTrigger::Manual);

        assert_eq!(session.navigate(1), 1);
    }
}
