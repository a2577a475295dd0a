use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

use assess_core::model::{
    AnswerSheet, AnswerValue, Grade, Question, QuestionBody, QuestionId,
};

use crate::error::GradingError;
use crate::grading::{GradingService, SubmissionIdentity};

/// In-process exact-match grader over a known question set.
///
/// Any short-answer question in the set forces `PendingReview` with no
/// score: those responses need instructor review before the score is final.
/// Otherwise the grade is the percentage of exactly-correct answers, with
/// unanswered questions counting as wrong.
pub struct AutoGrader {
    questions: HashMap<QuestionId, Question>,
}

impl AutoGrader {
    #[must_use]
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Self {
        Self {
            questions: questions.into_iter().map(|q| (q.id(), q)).collect(),
        }
    }

    fn is_correct(question: &Question, answer: Option<&AnswerValue>) -> bool {
        let Some(answer) = answer else {
            return false;
        };

        match (question.body(), answer) {
            (
                QuestionBody::MultipleChoice { correct_option, .. },
                AnswerValue::Choice(chosen),
            ) => chosen == correct_option,
            (QuestionBody::TrueFalse { correct_answer }, AnswerValue::Flag(flag)) => {
                flag == correct_answer
            }
            (
                QuestionBody::MultipleSelect {
                    correct_options, ..
                },
                AnswerValue::Selections(selected),
            ) => {
                let expected: BTreeSet<usize> = correct_options.iter().copied().collect();
                *selected == expected
            }
            (
                QuestionBody::ShortAnswer { acceptable_answers }
                | QuestionBody::FillBlank { acceptable_answers },
                AnswerValue::Text(text),
            ) => acceptable_answers
                .iter()
                .any(|accepted| accepted.trim().eq_ignore_ascii_case(text.trim())),
            // The capture layer never stores mismatched shapes; grade them
            // as wrong rather than guessing.
            (_, _) => false,
        }
    }
}

#[async_trait]
impl GradingService for AutoGrader {
    async fn submit(
        &self,
        _identity: &SubmissionIdentity,
        answers: &AnswerSheet,
    ) -> Result<Grade, GradingError> {
        if self.questions.values().any(|q| !q.is_auto_graded()) {
            return Ok(Grade::pending_review());
        }
        if self.questions.is_empty() {
            return Ok(Grade::graded(0.0));
        }

        let correct = self
            .questions
            .values()
            .filter(|q| Self::is_correct(q, answers.answer(q.id())))
            .count();

        #[allow(clippy::cast_precision_loss)]
        let score = correct as f64 / self.questions.len() as f64 * 100.0;
        Ok(Grade::graded(score))
    }
}
