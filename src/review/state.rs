use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::pipeline::traits::CriticalResolver;
use crate::types::Token;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewerId(pub String);

impl ReviewerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Review record for one hypothesis word.
///
/// `index` is stable for the record's lifetime. ASR words keep their token
/// position; reviewer-inserted words get the next unused index, so no
/// existing index ever changes. Display order is the order of the
/// collection, not the order of indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordReviewState {
    pub index: usize,
    pub original_word: String,
    pub corrected_word: Option<String>,
    pub is_deleted: bool,
    pub is_inserted: bool,
    pub confidence: Option<f32>,
    pub corrected_by: Option<ReviewerId>,
    pub corrected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Unreviewed,
    Corrected,
    Confirmed,
    Deleted,
    Inserted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReviewAction {
    Correct { word: String },
    Confirm,
    Delete,
    /// The target index is a display position in `0..=len`.
    Insert { word: String },
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct { .. } => "correct",
            Self::Confirm => "confirm",
            Self::Delete => "delete",
            Self::Insert { .. } => "insert",
        }
    }
}

impl WordReviewState {
    pub fn from_token(token: &Token, confidence: Option<f32>) -> Self {
        Self {
            index: token.original_index,
            original_word: token.text.clone(),
            corrected_word: None,
            is_deleted: false,
            is_inserted: false,
            confidence: confidence.filter(|c| c.is_finite()).map(|c| c.clamp(0.0, 1.0)),
            corrected_by: None,
            corrected_at: None,
        }
    }

    pub fn status(&self) -> ReviewStatus {
        if self.is_deleted {
            ReviewStatus::Deleted
        } else if self.has_correction() {
            ReviewStatus::Corrected
        } else if self.is_inserted {
            ReviewStatus::Inserted
        } else if self.corrected_by.is_some() {
            ReviewStatus::Confirmed
        } else {
            ReviewStatus::Unreviewed
        }
    }

    /// A reviewer asserted the ASR output at this position was wrong.
    pub fn has_correction(&self) -> bool {
        self.corrected_word
            .as_deref()
            .is_some_and(|word| !word.trim().is_empty())
    }

    /// Reviewer-corrected ASR word still present in the transcript.
    pub fn is_critical(&self) -> bool {
        !self.is_deleted && !self.is_inserted && self.has_correction()
    }

    /// Word as it reads after review, or `None` when deleted.
    pub fn effective_word(&self) -> Option<&str> {
        if self.is_deleted {
            return None;
        }
        match self.corrected_word.as_deref() {
            Some(word) if !word.trim().is_empty() => Some(word),
            _ => Some(self.original_word.as_str()),
        }
    }

    fn attribute(&mut self, reviewer: &ReviewerId, at: DateTime<Utc>) {
        self.corrected_by = Some(reviewer.clone());
        self.corrected_at = Some(at);
    }
}

/// Bulk-creates one unreviewed record per hypothesis token.
pub fn initial_states(tokens: &[Token], confidences: Option<&[f32]>) -> Vec<WordReviewState> {
    tokens
        .iter()
        .enumerate()
        .map(|(pos, token)| {
            let confidence = confidences.and_then(|c| c.get(pos).copied());
            WordReviewState::from_token(token, confidence)
        })
        .collect()
}

/// Applies one reviewer transition and returns the new collection.
///
/// For `Correct`, `Confirm` and `Delete`, `index` is a record index. For
/// `Insert` it is the display position the new word takes. Correct and
/// Confirm on a deleted word restore it; undo is always a fresh transition.
/// A blank correction is stored as no correction and reads as a confirm.
pub fn apply_correction(
    states: &[WordReviewState],
    index: usize,
    action: ReviewAction,
    reviewer: &ReviewerId,
    at: DateTime<Utc>,
) -> Result<Vec<WordReviewState>, EvalError> {
    match action {
        ReviewAction::Insert { word } => insert_word(states, index, word, reviewer, at),
        ReviewAction::Correct { word } => update_word(states, index, reviewer, at, |record| {
            let word = word.trim();
            record.corrected_word = (!word.is_empty()).then(|| word.to_string());
            record.is_deleted = false;
        }),
        ReviewAction::Confirm => update_word(states, index, reviewer, at, |record| {
            record.corrected_word = None;
            record.is_deleted = false;
        }),
        ReviewAction::Delete => update_word(states, index, reviewer, at, |record| {
            record.is_deleted = true;
        }),
    }
}

fn update_word(
    states: &[WordReviewState],
    index: usize,
    reviewer: &ReviewerId,
    at: DateTime<Utc>,
    transition: impl FnOnce(&mut WordReviewState),
) -> Result<Vec<WordReviewState>, EvalError> {
    let mut next = states.to_vec();
    let Some(record) = next.iter_mut().find(|w| w.index == index) else {
        return Err(EvalError::InvalidIndex {
            index,
            len: states.len(),
        });
    };
    transition(record);
    record.attribute(reviewer, at);
    Ok(next)
}

fn insert_word(
    states: &[WordReviewState],
    position: usize,
    word: String,
    reviewer: &ReviewerId,
    at: DateTime<Utc>,
) -> Result<Vec<WordReviewState>, EvalError> {
    if position > states.len() {
        return Err(EvalError::InvalidIndex {
            index: position,
            len: states.len(),
        });
    }
    let new_index = states.iter().map(|w| w.index + 1).max().unwrap_or(0);
    let mut next = states.to_vec();
    next.insert(
        position,
        WordReviewState {
            index: new_index,
            original_word: word,
            corrected_word: None,
            is_deleted: false,
            is_inserted: true,
            confidence: None,
            corrected_by: Some(reviewer.clone()),
            corrected_at: Some(at),
        },
    );
    Ok(next)
}

impl CriticalResolver for [WordReviewState] {
    fn is_critical(&self, hypothesis_index: usize) -> bool {
        self.iter()
            .find(|w| w.index == hypothesis_index && !w.is_inserted)
            .is_some_and(WordReviewState::is_critical)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::alignment::tokenization::tokenize;

    fn reviewer() -> ReviewerId {
        ReviewerId::new("reviewer-1")
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn states(text: &str) -> Vec<WordReviewState> {
        initial_states(&tokenize(text), None)
    }

    #[test]
    fn initial_states_are_unreviewed() {
        let s = initial_states(&tokenize("a b c"), Some(&[0.9, 1.5, f32::NAN]));
        assert_eq!(s.len(), 3);
        assert!(s.iter().all(|w| w.status() == ReviewStatus::Unreviewed));
        assert_eq!(s[0].confidence, Some(0.9));
        assert_eq!(s[1].confidence, Some(1.0));
        assert_eq!(s[2].confidence, None);
    }

    #[test]
    fn correct_records_attribution() {
        let s = apply_correction(
            &states("a b c"),
            1,
            ReviewAction::Correct { word: "x".into() },
            &reviewer(),
            at(),
        )
        .unwrap();
        assert_eq!(s[1].status(), ReviewStatus::Corrected);
        assert_eq!(s[1].corrected_word.as_deref(), Some("x"));
        assert_eq!(s[1].corrected_by, Some(reviewer()));
        assert_eq!(s[1].corrected_at, Some(at()));
        assert!(s[..].is_critical(1));
        assert!(!s[..].is_critical(0));
    }

    #[test]
    fn confirm_clears_prior_correction() {
        let s = apply_correction(
            &states("a b"),
            0,
            ReviewAction::Correct { word: "z".into() },
            &reviewer(),
            at(),
        )
        .unwrap();
        let s = apply_correction(&s, 0, ReviewAction::Confirm, &reviewer(), at()).unwrap();
        assert_eq!(s[0].status(), ReviewStatus::Confirmed);
        assert!(s[0].corrected_word.is_none());
        assert!(!s[..].is_critical(0));
    }

    #[test]
    fn delete_then_confirm_restores_word() {
        let s = apply_correction(&states("a b"), 1, ReviewAction::Delete, &reviewer(), at())
            .unwrap();
        assert_eq!(s[1].status(), ReviewStatus::Deleted);
        assert!(s[1].effective_word().is_none());
        let s = apply_correction(&s, 1, ReviewAction::Confirm, &reviewer(), at()).unwrap();
        assert_eq!(s[1].status(), ReviewStatus::Confirmed);
        assert_eq!(s[1].effective_word(), Some("b"));
    }

    #[test]
    fn insert_appends_index_and_keeps_existing() {
        let s = apply_correction(
            &states("a b c"),
            1,
            ReviewAction::Insert { word: "new".into() },
            &reviewer(),
            at(),
        )
        .unwrap();
        let indices: Vec<usize> = s.iter().map(|w| w.index).collect();
        assert_eq!(indices, [0, 3, 1, 2]);
        assert_eq!(s[1].status(), ReviewStatus::Inserted);
        assert!(s[1].is_inserted);
    }

    #[test]
    fn insert_at_end_is_allowed() {
        let s = apply_correction(
            &states("a"),
            1,
            ReviewAction::Insert { word: "b".into() },
            &reviewer(),
            at(),
        )
        .unwrap();
        assert_eq!(s.last().map(|w| w.original_word.as_str()), Some("b"));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = apply_correction(
            &states("a b"),
            7,
            ReviewAction::Correct { word: "x".into() },
            &reviewer(),
            at(),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidIndex { index: 7, len: 2 }));

        let err = apply_correction(
            &states("a b"),
            3,
            ReviewAction::Insert { word: "x".into() },
            &reviewer(),
            at(),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidIndex { index: 3, .. }));
    }

    #[test]
    fn blank_correction_is_not_critical() {
        let s = apply_correction(
            &states("a"),
            0,
            ReviewAction::Correct { word: "  ".into() },
            &reviewer(),
            at(),
        )
        .unwrap();
        assert!(!s[..].is_critical(0));
        assert_eq!(s[0].corrected_word, None);
        assert_eq!(s[0].status(), ReviewStatus::Confirmed);
        assert_eq!(s[0].effective_word(), Some("a"));
    }

    #[test]
    fn correction_is_trimmed() {
        let s = apply_correction(
            &states("a"),
            0,
            ReviewAction::Correct { word: " b ".into() },
            &reviewer(),
            at(),
        )
        .unwrap();
        assert_eq!(s[0].corrected_word.as_deref(), Some("b"));
    }

    #[test]
    fn deleted_correction_is_not_critical() {
        let s = apply_correction(
            &states("a b"),
            1,
            ReviewAction::Correct { word: "x".into() },
            &reviewer(),
            at(),
        )
        .unwrap();
        let s = apply_correction(&s, 1, ReviewAction::Delete, &reviewer(), at()).unwrap();
        assert_eq!(s[1].status(), ReviewStatus::Deleted);
        assert!(!s[1].is_critical());
        assert!(!s[..].is_critical(1));
    }

    #[test]
    fn input_collection_is_not_mutated() {
        let original = states("a b");
        let _ = apply_correction(&original, 0, ReviewAction::Delete, &reviewer(), at()).unwrap();
        assert!(!original[0].is_deleted);
    }
}
