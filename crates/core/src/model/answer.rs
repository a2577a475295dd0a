use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionBody};

//
// ─── ANSWER VALUES ─────────────────────────────────────────────────────────────
//

/// A captured response in its native shape.
///
/// The JSON encoding is the bare value (string, number, boolean, or array of
/// numbers); the question id key carries the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Choice(usize),
    Selections(BTreeSet<usize>),
    Text(String),
}

impl AnswerValue {
    /// Whether this value's shape fits the question's variant.
    ///
    /// An option index addressing no option is treated as a shape mismatch.
    #[must_use]
    pub fn matches(&self, body: &QuestionBody) -> bool {
        match (self, body) {
            (AnswerValue::Choice(index), QuestionBody::MultipleChoice { options, .. }) => {
                *index < options.len()
            }
            (AnswerValue::Flag(_), QuestionBody::TrueFalse { .. }) => true,
            (AnswerValue::Text(_), QuestionBody::ShortAnswer { .. }) => true,
            (AnswerValue::Selections(selected), QuestionBody::MultipleSelect { options, .. }) => {
                selected.iter().all(|&i| i < options.len())
            }
            (AnswerValue::Text(_), QuestionBody::FillBlank { .. }) => true,
            _ => false,
        }
    }
}

//
// ─── ANSWER SHEET ──────────────────────────────────────────────────────────────
//

/// Unordered mapping from question id to captured answer; last write wins.
///
/// Capture never throws: values whose shape does not match the question are
/// silently discarded, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    entries: HashMap<QuestionId, AnswerValue>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value for the question, replacing any prior value.
    ///
    /// Returns whether the value was accepted; a shape mismatch is dropped.
    pub fn record(&mut self, question: &Question, value: AnswerValue) -> bool {
        if !value.matches(question.body()) {
            return false;
        }
        self.entries.insert(question.id(), value);
        true
    }

    /// Flip membership of `index` in a multiple-select answer.
    ///
    /// Toggling twice restores the prior set, including the explicit empty
    /// set when nothing remains selected. Returns whether the toggle applied;
    /// non-select questions and out-of-range indices are dropped.
    pub fn toggle_selection(&mut self, question: &Question, index: usize) -> bool {
        let QuestionBody::MultipleSelect { options, .. } = question.body() else {
            return false;
        };
        if index >= options.len() {
            return false;
        }

        let entry = self
            .entries
            .entry(question.id())
            .or_insert_with(|| AnswerValue::Selections(BTreeSet::new()));
        let AnswerValue::Selections(selected) = entry else {
            // A mismatched value cannot have been stored; normalize anyway.
            *entry = AnswerValue::Selections(BTreeSet::from([index]));
            return true;
        };

        if !selected.insert(index) {
            selected.remove(&index);
        }
        true
    }

    /// Whether any value is stored for the question.
    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn answer(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.entries.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerValue)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn select_question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            "Pick all that apply",
            QuestionBody::MultipleSelect {
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_options: vec![0, 2],
            },
        )
        .unwrap()
    }

    fn choice_question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            "Pick one",
            QuestionBody::MultipleChoice {
                options: vec!["A".into(), "B".into()],
                correct_option: 1,
            },
        )
        .unwrap()
    }

    #[test]
    fn record_accepts_matching_shape() {
        let q = choice_question(1);
        let mut sheet = AnswerSheet::new();

        assert!(sheet.record(&q, AnswerValue::Choice(0)));
        assert_eq!(sheet.answer(q.id()), Some(&AnswerValue::Choice(0)));
    }

    #[test]
    fn record_silently_discards_mismatched_shape() {
        let q = choice_question(1);
        let mut sheet = AnswerSheet::new();

        assert!(!sheet.record(&q, AnswerValue::Text("B".into())));
        assert!(!sheet.record(&q, AnswerValue::Flag(true)));
        assert!(!sheet.is_answered(q.id()));
    }

    #[test]
    fn record_rejects_out_of_range_choice() {
        let q = choice_question(1);
        let mut sheet = AnswerSheet::new();

        assert!(!sheet.record(&q, AnswerValue::Choice(2)));
        assert!(!sheet.is_answered(q.id()));
    }

    #[test]
    fn last_write_wins() {
        let q = choice_question(1);
        let mut sheet = AnswerSheet::new();

        sheet.record(&q, AnswerValue::Choice(0));
        sheet.record(&q, AnswerValue::Choice(1));
        assert_eq!(sheet.answer(q.id()), Some(&AnswerValue::Choice(1)));
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn toggle_flips_membership() {
        let q = select_question(1);
        let mut sheet = AnswerSheet::new();

        assert!(sheet.toggle_selection(&q, 1));
        assert_eq!(
            sheet.answer(q.id()),
            Some(&AnswerValue::Selections(BTreeSet::from([1])))
        );

        sheet.toggle_selection(&q, 2);
        assert_eq!(
            sheet.answer(q.id()),
            Some(&AnswerValue::Selections(BTreeSet::from([1, 2])))
        );
    }

    #[test]
    fn double_toggle_returns_to_explicit_empty_set() {
        let q = select_question(1);
        let mut sheet = AnswerSheet::new();

        sheet.toggle_selection(&q, 1);
        sheet.toggle_selection(&q, 1);

        // The empty set is a stored answer, not "no answer".
        assert!(sheet.is_answered(q.id()));
        assert_eq!(
            sheet.answer(q.id()),
            Some(&AnswerValue::Selections(BTreeSet::new()))
        );
    }

    #[test]
    fn toggle_rejected_for_non_select_question() {
        let q = choice_question(1);
        let mut sheet = AnswerSheet::new();

        assert!(!sheet.toggle_selection(&q, 0));
        assert!(!sheet.is_answered(q.id()));
    }

    #[test]
    fn toggle_rejected_for_out_of_range_index() {
        let q = select_question(1);
        let mut sheet = AnswerSheet::new();

        assert!(!sheet.toggle_selection(&q, 3));
        assert!(!sheet.is_answered(q.id()));
    }

    #[test]
    fn sheet_serializes_to_plain_json_mapping() {
        let select = select_question(5);
        let choice = choice_question(9);
        let mut sheet = AnswerSheet::new();
        sheet.record(&choice, AnswerValue::Choice(1));
        sheet.toggle_selection(&select, 0);
        sheet.toggle_selection(&select, 2);

        let json = serde_json::to_value(&sheet).unwrap();
        assert_eq!(json["9"], 1);
        assert_eq!(json["5"], serde_json::json!([0, 2]));
    }
}
