use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResponseError {
    #[error("question index {index} is out of range for {len} slots")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One slot per question, unset until the user picks an option.
///
/// Slots may stay unset when the user skips ahead and the timer expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSet {
    slots: Vec<Option<String>>,
}

impl ResponseSet {
    /// Creates an empty set with `len` unset slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Rebuild a set from previously stored slots.
    #[must_use]
    pub fn from_slots(slots: Vec<Option<String>>) -> Self {
        Self { slots }
    }

    /// Record `option` at `index`, overwriting any prior choice there.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::IndexOutOfRange` if `index` is past the last slot.
    pub fn select(&mut self, index: usize, option: impl Into<String>) -> Result<(), ResponseError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ResponseError::IndexOutOfRange { index, len })?;
        *slot = Some(option.into());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|s| s.as_deref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding a selection.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<String>] {
        &self.slots
    }

    /// Drop unset slots, preserving the relative order of the set ones.
    #[must_use]
    pub fn compact(&self) -> Vec<String> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Count the slots whose selection matches the answer of the question at
    /// the same index. Skipped questions score zero and do not shift later
    /// answers onto earlier questions.
    #[must_use]
    pub fn score_against(&self, questions: &[Question]) -> u32 {
        self.slots
            .iter()
            .zip(questions)
            .filter(|(slot, question)| {
                slot.as_deref()
                    .is_some_and(|selected| question.is_correct(selected))
            })
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question_bank;

    #[test]
    fn select_overwrites_prior_choice() {
        let mut responses = ResponseSet::new(3);
        responses.select(1, "first").unwrap();
        responses.select(1, "second").unwrap();
        assert_eq!(responses.get(1), Some("second"));
        assert_eq!(responses.answered_count(), 1);
    }

    #[test]
    fn select_out_of_range_fails() {
        let mut responses = ResponseSet::new(3);
        let err = responses.select(3, "x").unwrap_err();
        assert_eq!(err, ResponseError::IndexOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn compact_drops_gaps_and_preserves_order() {
        let responses = ResponseSet::from_slots(vec![
            Some("A".to_string()),
            None,
            Some("B".to_string()),
        ]);
        assert_eq!(responses.compact(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn full_correct_responses_score_everything() {
        let questions = question_bank();
        let mut responses = ResponseSet::new(questions.len());
        for (index, question) in questions.iter().enumerate() {
            responses.select(index, question.answer()).unwrap();
        }
        assert_eq!(responses.score_against(&questions), 10);
    }

    #[test]
    fn first_two_correct_answers_score_two() {
        let questions = question_bank();
        let mut responses = ResponseSet::new(questions.len());
        responses.select(0, "Uniswap").unwrap();
        responses.select(1, "Decentralized Finance").unwrap();
        assert_eq!(responses.score_against(&questions), 2);
    }

    #[test]
    fn skipped_slot_scores_against_its_own_question() {
        let questions = question_bank();
        let mut responses = ResponseSet::new(questions.len());
        // Skip question 0; answer question 1 correctly. Compacting would
        // shift "Decentralized Finance" onto the question-0 slot where it is
        // wrong; slot-wise scoring keeps it paired with question 1.
        responses.select(1, "Decentralized Finance").unwrap();
        assert_eq!(responses.score_against(&questions), 1);
        assert_eq!(responses.compact().len(), 1);
    }
}
