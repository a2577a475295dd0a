mod answer;
mod definition;
mod grade;
mod ids;
mod question;

pub use answer::{AnswerSheet, AnswerValue};
pub use definition::{AssessmentDefinition, DefinitionError, DeliveryMode};
pub use grade::{Grade, GradeStatus};
pub use ids::{AssessmentId, AttemptId, QuestionId};
pub use question::{BLANK_MARKER, Question, QuestionBody, QuestionError, QuestionKind};
