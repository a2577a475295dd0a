#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod grading;
pub mod sessions;
pub mod shuffle;

pub use assess_core::Clock;

pub use countdown::CountdownTimer;
pub use error::{AttemptError, GradingError};
pub use grading::{AutoGrader, GradingService, HttpGradingClient, SubmissionIdentity};
pub use sessions::{
    AssessmentSession, AttemptLoopService, SessionHandle, SessionPhase, SessionProgress,
    SessionSnapshot, SubmissionController, SubmissionPhase, SubmitOutcome, SubmitTrigger,
};
pub use shuffle::shuffle;
