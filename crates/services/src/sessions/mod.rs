mod progress;
mod service;
mod submission;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::AttemptError;
pub use progress::SessionProgress;
pub use service::{AssessmentSession, SessionPhase};
pub use submission::{SubmissionController, SubmissionPhase, SubmitTrigger};
pub use view::{SessionSnapshot, format_remaining};
pub use workflow::{AttemptLoopService, SessionHandle, SubmitOutcome};
