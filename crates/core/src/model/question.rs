use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Literal marker a fill-in-the-blank stem uses to position its single input.
pub const BLANK_MARKER: &str = "___";

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// The per-variant payload of a question.
///
/// Correct-answer fields exist for grading; the capture layer never reads
/// them. Adding a variant is a compile-time change: every consumption site
/// matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionBody {
    MultipleChoice {
        options: Vec<String>,
        correct_option: usize,
    },
    TrueFalse {
        correct_answer: bool,
    },
    ShortAnswer {
        acceptable_answers: Vec<String>,
    },
    MultipleSelect {
        options: Vec<String>,
        correct_options: Vec<usize>,
    },
    FillBlank {
        acceptable_answers: Vec<String>,
    },
}

/// Fieldless tag of a question variant, for display and branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    MultipleSelect,
    FillBlank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    stem: String,
    #[serde(flatten)]
    body: QuestionBody,
}

impl Question {
    /// Create a question, validating structural sanity of the body.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyStem` if the stem is blank.
    /// Returns `QuestionError::NoOptions` for choice variants without options.
    /// Returns `QuestionError::CorrectIndexOutOfRange` if a correct index does
    /// not address an option.
    /// Returns `QuestionError::MissingBlankMarker` if a fill-blank stem lacks
    /// the literal `___` marker.
    pub fn new(
        id: QuestionId,
        stem: impl Into<String>,
        body: QuestionBody,
    ) -> Result<Self, QuestionError> {
        let stem = stem.into();
        if stem.trim().is_empty() {
            return Err(QuestionError::EmptyStem);
        }

        match &body {
            QuestionBody::MultipleChoice {
                options,
                correct_option,
            } => {
                if options.is_empty() {
                    return Err(QuestionError::NoOptions);
                }
                if *correct_option >= options.len() {
                    return Err(QuestionError::CorrectIndexOutOfRange {
                        index: *correct_option,
                        options: options.len(),
                    });
                }
            }
            QuestionBody::MultipleSelect {
                options,
                correct_options,
            } => {
                if options.is_empty() {
                    return Err(QuestionError::NoOptions);
                }
                if let Some(&index) = correct_options.iter().find(|&&i| i >= options.len()) {
                    return Err(QuestionError::CorrectIndexOutOfRange {
                        index,
                        options: options.len(),
                    });
                }
            }
            QuestionBody::FillBlank { .. } => {
                if !stem.contains(BLANK_MARKER) {
                    return Err(QuestionError::MissingBlankMarker);
                }
            }
            QuestionBody::TrueFalse { .. } | QuestionBody::ShortAnswer { .. } => {}
        }

        Ok(Self { id, stem, body })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn body(&self) -> &QuestionBody {
        &self.body
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self.body {
            QuestionBody::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            QuestionBody::TrueFalse { .. } => QuestionKind::TrueFalse,
            QuestionBody::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            QuestionBody::MultipleSelect { .. } => QuestionKind::MultipleSelect,
            QuestionBody::FillBlank { .. } => QuestionKind::FillBlank,
        }
    }

    /// Whether a response can be scored by exact-match comparison.
    ///
    /// Short answers require instructor review before the score is final.
    #[must_use]
    pub fn is_auto_graded(&self) -> bool {
        match self.kind() {
            QuestionKind::ShortAnswer => false,
            QuestionKind::MultipleChoice
            | QuestionKind::TrueFalse
            | QuestionKind::MultipleSelect
            | QuestionKind::FillBlank => true,
        }
    }

    /// For a fill-blank stem, the text before and after the single input.
    ///
    /// Returns `None` for other variants.
    #[must_use]
    pub fn blank_parts(&self) -> Option<(&str, &str)> {
        match self.body {
            QuestionBody::FillBlank { .. } => self.stem.split_once(BLANK_MARKER),
            _ => None,
        }
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question stem is empty")]
    EmptyStem,

    #[error("choice question has no options")]
    NoOptions,

    #[error("correct index {index} is out of range for {options} options")]
    CorrectIndexOutOfRange { index: usize, options: usize },

    #[error("fill-blank stem does not contain the `{BLANK_MARKER}` marker")]
    MissingBlankMarker,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
