use assess_core::model::Grade;

//
// ─── TRIGGERS AND PHASES ───────────────────────────────────────────────────────
//

/// What asked for the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    TimerExpiry,
}

/// Lifecycle of one attempt's submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    NotStarted,
    InProgress,
    Submitting,
    Submitted,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine guaranteeing at most one grading call per attempt.
///
/// `NotStarted -> InProgress -> Submitting -> Submitted`, with `Submitting`
/// falling back to `InProgress` on a retryable failure. Ticks and
/// user-driven events never run truly in parallel, but they can race in
/// program order: the timer firing the same instant the user clicks
/// submit, or a double click. `begin` is the gate; whichever trigger
/// arrives second observes a non-`InProgress` phase and becomes a no-op.
#[derive(Debug, Default)]
pub struct SubmissionController {
    phase: Phase,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    NotStarted,
    InProgress,
    Submitting(SubmitTrigger),
    Submitted(Grade),
}

impl SubmissionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the attempt. Valid only from `NotStarted`; otherwise a no-op.
    pub fn start(&mut self) -> bool {
        if matches!(self.phase, Phase::NotStarted) {
            self.phase = Phase::InProgress;
            return true;
        }
        false
    }

    /// Claim the single grading call for `trigger`.
    ///
    /// Returns `true` exactly once per attempt (unless a failure rolled the
    /// attempt back); every losing or repeated trigger gets `false` and
    /// must do nothing.
    pub fn begin(&mut self, trigger: SubmitTrigger) -> bool {
        if matches!(self.phase, Phase::InProgress) {
            self.phase = Phase::Submitting(trigger);
            return true;
        }
        false
    }

    /// Record the grade returned by the grading service.
    pub fn complete(&mut self, grade: Grade) {
        if matches!(self.phase, Phase::Submitting(_)) {
            self.phase = Phase::Submitted(grade);
        }
    }

    /// Roll a failed submission back so the user can retry.
    pub fn fail(&mut self) {
        if matches!(self.phase, Phase::Submitting(_)) {
            self.phase = Phase::InProgress;
        }
    }

    #[must_use]
    pub fn phase(&self) -> SubmissionPhase {
        match self.phase {
            Phase::NotStarted => SubmissionPhase::NotStarted,
            Phase::InProgress => SubmissionPhase::InProgress,
            Phase::Submitting(_) => SubmissionPhase::Submitting,
            Phase::Submitted(_) => SubmissionPhase::Submitted,
        }
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(self.phase, Phase::InProgress)
    }

    /// The trigger that won the submission, while one is in flight.
    #[must_use]
    pub fn submitting_trigger(&self) -> Option<SubmitTrigger> {
        match self.phase {
            Phase::Submitting(trigger) => Some(trigger),
            _ => None,
        }
    }

    #[must_use]
    pub fn grade(&self) -> Option<&Grade> {
        match &self.phase {
            Phase::Submitted(grade) => Some(grade),
            _ => None,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
