use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::pipeline::traits::CriticalResolver;
use crate::review::state::{
    apply_correction, initial_states, ReviewAction, ReviewStatus, ReviewerId, WordReviewState,
};
use crate::types::Token;

/// Whether a transcript is part of the training-data export. Orthogonal to
/// words, alignment and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingFlag {
    #[default]
    Excluded,
    Included,
}

impl TrainingFlag {
    pub fn toggled(self) -> Self {
        match self {
            Self::Excluded => Self::Included,
            Self::Included => Self::Excluded,
        }
    }
}

/// Review state for one hypothesis transcript.
///
/// The collection is owned by the caller, who serializes concurrent
/// mutations (one in-flight mutation per transcript). `version` increments
/// on every successful mutation so callers can detect stale copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptReview {
    pub transcript_id: String,
    pub version: u64,
    #[serde(default)]
    pub training_flag: TrainingFlag,
    pub words: Vec<WordReviewState>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReviewSummary {
    pub total_words: usize,
    pub unreviewed: usize,
    pub corrected: usize,
    pub confirmed: usize,
    pub deleted: usize,
    pub inserted: usize,
    pub low_confidence: usize,
    /// Fraction of words touched by a reviewer, in [0, 1].
    pub reviewed_ratio: f32,
}

impl TranscriptReview {
    pub fn from_tokens(
        transcript_id: impl Into<String>,
        tokens: &[Token],
        confidences: Option<&[f32]>,
    ) -> Self {
        Self {
            transcript_id: transcript_id.into(),
            version: 0,
            training_flag: TrainingFlag::default(),
            words: initial_states(tokens, confidences),
        }
    }

    pub fn apply(
        &mut self,
        index: usize,
        action: ReviewAction,
        reviewer: &ReviewerId,
        at: DateTime<Utc>,
    ) -> Result<(), EvalError> {
        let action_name = action.as_str();
        let words = apply_correction(&self.words, index, action, reviewer, at)?;
        self.words = words;
        self.version += 1;
        tracing::debug!(
            transcript_id = self.transcript_id.as_str(),
            index,
            action = action_name,
            reviewer = reviewer.0.as_str(),
            version = self.version,
            "review: transition applied"
        );
        Ok(())
    }

    pub fn correct(
        &mut self,
        index: usize,
        word: impl Into<String>,
        reviewer: &ReviewerId,
        at: DateTime<Utc>,
    ) -> Result<(), EvalError> {
        self.apply(index, ReviewAction::Correct { word: word.into() }, reviewer, at)
    }

    pub fn confirm(
        &mut self,
        index: usize,
        reviewer: &ReviewerId,
        at: DateTime<Utc>,
    ) -> Result<(), EvalError> {
        self.apply(index, ReviewAction::Confirm, reviewer, at)
    }

    pub fn delete(
        &mut self,
        index: usize,
        reviewer: &ReviewerId,
        at: DateTime<Utc>,
    ) -> Result<(), EvalError> {
        self.apply(index, ReviewAction::Delete, reviewer, at)
    }

    pub fn insert_word(
        &mut self,
        word: impl Into<String>,
        position: usize,
        reviewer: &ReviewerId,
        at: DateTime<Utc>,
    ) -> Result<(), EvalError> {
        self.apply(position, ReviewAction::Insert { word: word.into() }, reviewer, at)
    }

    pub fn toggle_training_flag(&mut self) -> TrainingFlag {
        self.training_flag = self.training_flag.toggled();
        self.version += 1;
        tracing::debug!(
            transcript_id = self.transcript_id.as_str(),
            training_flag = ?self.training_flag,
            "review: training flag toggled"
        );
        self.training_flag
    }

    pub fn word(&self, index: usize) -> Option<&WordReviewState> {
        self.words.iter().find(|w| w.index == index)
    }

    /// Hypothesis indices whose substitutions count as critical.
    pub fn critical_indices(&self) -> HashSet<usize> {
        self.words
            .iter()
            .filter(|w| w.is_critical())
            .map(|w| w.index)
            .collect()
    }

    /// Reviewer-inserted, non-deleted words anchored inside the active
    /// hypothesis range. A word's anchor is the nearest preceding ASR word,
    /// or the nearest following one when it sits before all of them.
    pub fn inserted_within(&self, in_range: impl Fn(usize) -> bool) -> usize {
        let mut count = 0;
        for (pos, word) in self.words.iter().enumerate() {
            if !word.is_inserted || word.is_deleted {
                continue;
            }
            let preceding = self.words[..pos].iter().rev().find(|w| !w.is_inserted);
            let anchor =
                preceding.or_else(|| self.words[pos + 1..].iter().find(|w| !w.is_inserted));
            match anchor {
                Some(anchor) if !in_range(anchor.index) => {}
                _ => count += 1,
            }
        }
        count
    }

    /// Hypothesis text after review, in display order.
    pub fn reviewed_text(&self) -> String {
        self.words
            .iter()
            .filter_map(WordReviewState::effective_word)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn summary(&self, low_confidence_threshold: f32) -> ReviewSummary {
        let mut summary = ReviewSummary {
            total_words: self.words.len(),
            ..ReviewSummary::default()
        };
        for word in &self.words {
            match word.status() {
                ReviewStatus::Unreviewed => summary.unreviewed += 1,
                ReviewStatus::Corrected => summary.corrected += 1,
                ReviewStatus::Confirmed => summary.confirmed += 1,
                ReviewStatus::Deleted => summary.deleted += 1,
                ReviewStatus::Inserted => summary.inserted += 1,
            }
            if word
                .confidence
                .is_some_and(|c| c < low_confidence_threshold)
            {
                summary.low_confidence += 1;
            }
        }
        if summary.total_words > 0 {
            summary.reviewed_ratio =
                (summary.total_words - summary.unreviewed) as f32 / summary.total_words as f32;
        }
        summary
    }
}

impl CriticalResolver for TranscriptReview {
    fn is_critical(&self, hypothesis_index: usize) -> bool {
        self.words[..].is_critical(hypothesis_index)
    }
}

impl CriticalResolver for HashSet<usize> {
    fn is_critical(&self, hypothesis_index: usize) -> bool {
        self.contains(&hypothesis_index)
    }
}
