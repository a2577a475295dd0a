use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use assess_core::Clock;
use assess_core::model::{
    AnswerValue, AssessmentDefinition, AttemptId, Grade, Question, QuestionId,
};
use storage::QuestionStore;

use super::progress::SessionProgress;
use super::service::{AssessmentSession, SessionPhase};
use super::submission::SubmitTrigger;
use super::view::SessionSnapshot;
use crate::countdown::CountdownTimer;
use crate::error::AttemptError;
use crate::grading::{GradingService, SubmissionIdentity};
use crate::shuffle::shuffle;

//
// ─── SUBMIT OUTCOME ────────────────────────────────────────────────────────────
//

/// What happened to one submit trigger.
///
/// `Ignored` is the losing side of a race (timer expiry against a manual
/// click, or a double click) and is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(Grade),
    Ignored,
}

//
// ─── SESSION HANDLE ────────────────────────────────────────────────────────────
//

/// Shared ownership of one attempt's session.
///
/// The hosting view keeps a handle for the attempt's lifetime; the timer
/// task holds only a weak reference, so discarding the last handle lets the
/// countdown die and the session drop cleanly.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<AssessmentSession>>,
}

impl SessionHandle {
    fn new(session: AssessmentSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn from_arc(inner: Arc<Mutex<AssessmentSession>>) -> Self {
        Self { inner }
    }

    fn downgrade(&self) -> Weak<Mutex<AssessmentSession>> {
        Arc::downgrade(&self.inner)
    }

    fn lock(&self) -> MutexGuard<'_, AssessmentSession> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut AssessmentSession) -> R) -> R {
        f(&mut self.lock())
    }

    /// Point-in-time copy of the render surface.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(&self.lock())
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.lock().progress()
    }

    /// Materialized question order for outline rendering.
    #[must_use]
    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.lock().questions().iter().map(Question::id).collect()
    }

    /// Capture an answer; silently dropped outside `InProgress` or on a
    /// shape mismatch.
    pub fn record_answer(&self, id: QuestionId, value: AnswerValue) -> bool {
        let accepted = self.with(|session| session.record_answer(id, value));
        if !accepted {
            tracing::debug!(question = %id, "discarded answer value");
        }
        accepted
    }

    /// Flip one option of a multiple-select answer.
    pub fn toggle_selection(&self, id: QuestionId, index: usize) -> bool {
        self.with(|session| session.toggle_selection(id, index))
    }

    /// Move the current question by `delta`, clamped and quiz-gated.
    pub fn navigate(&self, delta: isize) -> usize {
        self.with(|session| session.navigate(delta))
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&*self.lock(), f)
    }
}

//
// ─── ATTEMPT LOOP SERVICE ──────────────────────────────────────────────────────
//

/// Orchestrates one attempt: fetch, order, shuffle, countdown, submission.
#[derive(Clone)]
pub struct AttemptLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionStore>,
    grading: Arc<dyn GradingService>,
}

impl AttemptLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionStore>,
        grading: Arc<dyn GradingService>,
    ) -> Self {
        Self {
            clock,
            questions,
            grading,
        }
    }

    /// Start a new attempt for the given definition.
    ///
    /// An empty definition short-circuits to a terminal `NotReady` session:
    /// nothing is fetched, no timer starts, submission is impossible. Any
    /// fetch failure (store error, or a question missing from the response)
    /// is blocking and surfaces before the attempt ever enters progress.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Store` or `AttemptError::MissingQuestion` on
    /// fetch failures.
    pub async fn start_attempt(
        &self,
        definition: AssessmentDefinition,
    ) -> Result<SessionHandle, AttemptError> {
        let attempt_id = AttemptId::new();
        let now = self.clock.now();

        if definition.is_empty() {
            tracing::warn!(assessment = %definition.id(), "definition has no questions; session is not ready");
            let session = AssessmentSession::new(definition, Vec::new(), attempt_id, now);
            return Ok(SessionHandle::new(session));
        }

        let fetched = self
            .questions
            .get_questions_by_ids(definition.question_ids())
            .await
            .inspect_err(|e| {
                tracing::warn!(assessment = %definition.id(), error = %e, "question fetch failed");
            })?;
        let mut ordered = resequence(definition.question_ids(), fetched)?;

        if definition.randomize() {
            ordered = shuffle(&ordered, &mut rand::rng());
        }

        tracing::info!(
            assessment = %definition.id(),
            attempt = %attempt_id,
            questions = ordered.len(),
            time_limit_minutes = definition.time_limit_minutes(),
            "attempt started",
        );

        let mut session = AssessmentSession::new(definition, ordered, attempt_id, now);
        session.begin();
        let handle = SessionHandle::new(session);

        if let Some(seconds) = handle.with(|session| session.remaining_seconds()) {
            self.arm_timer(&handle, seconds);
        }

        Ok(handle)
    }

    /// Submit the attempt for grading on behalf of `trigger`.
    ///
    /// The idempotency gate is taken under the session lock: exactly one
    /// trigger per attempt reaches the grading service, every other one
    /// returns `SubmitOutcome::Ignored`. On success the grade lands in the
    /// session; on failure the session returns to progress with its answers
    /// preserved and the countdown left stopped, awaiting an explicit retry.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Grading` when the grading call fails.
    pub async fn submit(
        &self,
        handle: &SessionHandle,
        trigger: SubmitTrigger,
    ) -> Result<SubmitOutcome, AttemptError> {
        let claim = handle.with(|session| {
            if !session.begin_submission(trigger) {
                return None;
            }
            let identity = SubmissionIdentity {
                assessment_id: session.definition().id(),
                attempt_id: session.attempt_id(),
                mode: session.definition().mode(),
            };
            Some((identity, session.answers().clone()))
        });

        let Some((identity, answers)) = claim else {
            tracing::debug!(?trigger, "submit trigger ignored");
            return Ok(SubmitOutcome::Ignored);
        };

        tracing::info!(
            attempt = %identity.attempt_id,
            ?trigger,
            answered = answers.len(),
            "submitting attempt for grading",
        );

        // The sole async I/O of the engine; no lock is held across it, and
        // the outcome is written into the session object so a torn-down view
        // simply drops it.
        match self.grading.submit(&identity, &answers).await {
            Ok(grade) => {
                let at = self.clock.now();
                handle.with(|session| session.complete_submission(grade.clone(), at));
                Ok(SubmitOutcome::Accepted(grade))
            }
            Err(error) => {
                tracing::warn!(attempt = %identity.attempt_id, error = %error, "grading call failed");
                handle.with(|session| session.fail_submission(error.to_string()));
                Err(AttemptError::Grading(error))
            }
        }
    }

    /// User-driven submission of the whole attempt.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Grading` when the grading call fails.
    pub async fn finalize(&self, handle: &SessionHandle) -> Result<SubmitOutcome, AttemptError> {
        self.submit(handle, SubmitTrigger::Manual).await
    }

    /// Arm the countdown. Both closures hold only a weak reference: a
    /// discarded session stops receiving ticks, and its expiry submit never
    /// spawns.
    fn arm_timer(&self, handle: &SessionHandle, seconds: u32) {
        let tick_target = handle.downgrade();
        let on_tick = move |remaining: u32| {
            if let Some(session) = tick_target.upgrade() {
                SessionHandle::from_arc(session).with(|s| s.set_remaining(remaining));
            }
        };

        let expire_target = handle.downgrade();
        let service = self.clone();
        let on_expire = move || {
            let Some(session) = expire_target.upgrade() else {
                return;
            };
            let handle = SessionHandle::from_arc(session);
            tokio::spawn(async move {
                if let Err(error) = service.submit(&handle, SubmitTrigger::TimerExpiry).await {
                    tracing::warn!(error = %error, "auto-submission on expiry failed");
                }
            });
        };

        let timer = CountdownTimer::start(seconds, on_tick, on_expire);
        handle.with(|session| session.attach_timer(timer));
    }
}

/// Re-sequence the store's unordered response into the requested id order.
///
/// # Errors
///
/// Returns `AttemptError::MissingQuestion` for the first requested id the
/// store did not return.
fn resequence(
    ids: &[QuestionId],
    fetched: Vec<Question>,
) -> Result<Vec<Question>, AttemptError> {
    let mut by_id: HashMap<QuestionId, Question> =
        fetched.into_iter().map(|q| (q.id(), q)).collect();

    ids.iter()
        .map(|id| by_id.remove(id).ok_or(AttemptError::MissingQuestion(*id)))
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::QuestionBody;

    fn build_question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}?"),
            QuestionBody::TrueFalse {
                correct_answer: true,
            },
        )
        .unwrap()
    }

    #[test]
    fn resequence_restores_requested_order() {
        let ids: Vec<QuestionId> = [3, 1, 2].into_iter().map(QuestionId::new).collect();
        let fetched = vec![build_question(1), build_question(2), build_question(3)];

        let ordered = resequence(&ids, fetched).unwrap();
        let order: Vec<u64> = ordered.iter().map(|q| q.id().value()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn resequence_flags_missing_questions() {
        let ids: Vec<QuestionId> = [1, 2].into_iter().map(QuestionId::new).collect();
        let fetched = vec![build_question(1)];

        let err = resequence(&ids, fetched).unwrap_err();
        assert!(matches!(
            err,
            AttemptError::MissingQuestion(id) if id == QuestionId::new(2)
        ));
    }
}
