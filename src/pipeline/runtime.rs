use std::collections::HashSet;

use crate::alignment::metrics::{character_alignment, metrics_from_counts, ErrorCounts};
use crate::alignment::range::restrict;
use crate::cleaning::{clean, PresetRegistry};
use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::pipeline::defaults::Unreviewed;
use crate::pipeline::traits::{SequenceAligner, Tokenizer};
use crate::review::{ReviewSummary, TranscriptReview};
use crate::types::{Alignment, CleaningResult, Metrics, Token, TokenRange};

/// Word alignment and metrics for one reference/hypothesis pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub alignment: Alignment,
    pub metrics: Metrics,
}

pub struct Evaluator {
    config: EvalConfig,
    presets: PresetRegistry,
    tokenizer: Box<dyn Tokenizer>,
    sequence_aligner: Box<dyn SequenceAligner>,
}

pub(crate) struct EvaluatorParts {
    pub config: EvalConfig,
    pub presets: PresetRegistry,
    pub tokenizer: Box<dyn Tokenizer>,
    pub sequence_aligner: Box<dyn SequenceAligner>,
}

impl Evaluator {
    pub(crate) fn from_parts(parts: EvaluatorParts) -> Self {
        Self {
            config: parts.config,
            presets: parts.presets,
            tokenizer: parts.tokenizer,
            sequence_aligner: parts.sequence_aligner,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    /// Tokenizes with the configured tokenizer. Review collections should be
    /// built from this output so record indices match hypothesis tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenizer.tokenize(text)
    }

    pub fn align(&self, reference: &[Token], hypothesis: &[Token]) -> Alignment {
        self.sequence_aligner.align(reference, hypothesis)
    }

    /// Scores `hypothesis_text` against `reference_text`.
    ///
    /// Word metrics honour `range`; CER always covers both full texts. With a
    /// review, corrected substitutions count as critical and reviewer-inserted
    /// words inside the hypothesis range count as insertions.
    pub fn evaluate(
        &self,
        reference_text: &str,
        hypothesis_text: &str,
        range: &TokenRange,
        review: Option<&TranscriptReview>,
    ) -> Result<Evaluation, EvalError> {
        let reference = self.tokenize(reference_text);
        let hypothesis = self.tokenize(hypothesis_text);
        let (reference_scoped, hypothesis_scoped) = restrict(&reference, &hypothesis, range)?;

        if reference_scoped.is_empty() {
            tracing::warn!(
                hypothesis_words = hypothesis_scoped.len(),
                "evaluation: empty reference, word rates reported as 0"
            );
        }

        let alignment = self.align(&reference_scoped, &hypothesis_scoped);
        let mut words = match review {
            Some(review) => ErrorCounts::from_alignment(&alignment, &review.critical_indices()),
            None => ErrorCounts::from_alignment(&alignment, &Unreviewed),
        };
        if let Some(review) = review {
            words.insertions += review_insertions(review, range, &hypothesis_scoped);
        }

        let char_alignment =
            character_alignment(&join_tokens(&reference), &join_tokens(&hypothesis));
        let chars = ErrorCounts::from_alignment(&char_alignment, &Unreviewed);
        let metrics = metrics_from_counts(&words, &chars);

        tracing::debug!(
            reference_words = words.reference_count,
            insertions = metrics.insertions,
            deletions = metrics.deletions,
            substitutions = metrics.substitutions,
            critical_substitutions = metrics.critical_substitutions,
            wer = format!("{:.2}", metrics.wer),
            custom_wer = format!("{:.2}", metrics.custom_wer),
            cer = format!("{:.2}", metrics.cer),
            "evaluation: scored"
        );

        Ok(Evaluation {
            alignment: match review {
                Some(review) => alignment.with_critical_flags(review),
                None => alignment,
            },
            metrics,
        })
    }

    pub fn clean(&self, raw: &str, preset_name: &str) -> Result<CleaningResult, EvalError> {
        let preset = self.presets.get(preset_name)?;
        Ok(clean(raw, preset))
    }

    /// Like [`Evaluator::clean`], but an unknown preset falls back to the
    /// configured default preset.
    pub fn clean_or_default(
        &self,
        raw: &str,
        preset_name: &str,
    ) -> Result<CleaningResult, EvalError> {
        match self.presets.get(preset_name) {
            Ok(preset) => Ok(clean(raw, preset)),
            Err(EvalError::UnknownPreset { name }) => {
                tracing::warn!(
                    requested = name.as_str(),
                    fallback = self.config.default_preset.as_str(),
                    "cleaning: unknown preset, using default"
                );
                self.clean(raw, &self.config.default_preset)
            }
            Err(err) => Err(err),
        }
    }

    pub fn review_summary(&self, review: &TranscriptReview) -> ReviewSummary {
        review.summary(self.config.low_confidence_threshold)
    }
}

fn review_insertions(
    review: &TranscriptReview,
    range: &TokenRange,
    hypothesis_scoped: &[Token],
) -> usize {
    if range.hypothesis.is_full() {
        return review.inserted_within(|_| true);
    }
    let active: HashSet<usize> = hypothesis_scoped.iter().map(|t| t.original_index).collect();
    review.inserted_within(|idx| active.contains(&idx))
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
