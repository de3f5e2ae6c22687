use serde::Serialize;

use crate::alignment::operations::align;
use crate::alignment::tokenization::tokenize_chars;
use crate::pipeline::traits::CriticalResolver;
use crate::types::{Alignment, Metrics, Operation};

/// Operation counts for one alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ErrorCounts {
    pub insertions: usize,
    pub deletions: usize,
    pub substitutions: usize,
    pub critical_substitutions: usize,
    /// Reference units taking part in the alignment (correct + substituted + deleted).
    pub reference_count: usize,
}

impl ErrorCounts {
    pub fn from_alignment<R>(alignment: &Alignment, resolver: &R) -> Self
    where
        R: CriticalResolver + ?Sized,
    {
        let mut counts = Self::default();
        for op in alignment {
            match op {
                Operation::Correct { .. } => counts.reference_count += 1,
                Operation::Substitution { hypothesis, .. } => {
                    counts.reference_count += 1;
                    counts.substitutions += 1;
                    if resolver.is_critical(hypothesis.original_index) {
                        counts.critical_substitutions += 1;
                    }
                }
                Operation::Insertion { .. } => counts.insertions += 1,
                Operation::Deletion { .. } => {
                    counts.reference_count += 1;
                    counts.deletions += 1;
                }
            }
        }
        counts
    }

    pub fn errors(&self) -> usize {
        self.insertions + self.deletions + self.substitutions
    }

    /// Insertions and deletions always count; substitutions only when critical.
    pub fn custom_errors(&self) -> usize {
        self.insertions + self.deletions + self.critical_substitutions
    }

    pub fn error_rate(&self) -> f64 {
        percentage(self.errors(), self.reference_count)
    }

    pub fn custom_error_rate(&self) -> f64 {
        percentage(self.custom_errors(), self.reference_count)
    }
}

/// Derives WER, Custom WER and CER. The character alignment is never
/// range-restricted; see [`character_alignment`].
pub fn score<R>(word_alignment: &Alignment, char_alignment: &Alignment, resolver: &R) -> Metrics
where
    R: CriticalResolver + ?Sized,
{
    let words = ErrorCounts::from_alignment(word_alignment, resolver);
    let chars = ErrorCounts::from_alignment(char_alignment, &crate::pipeline::defaults::Unreviewed);
    metrics_from_counts(&words, &chars)
}

pub(crate) fn metrics_from_counts(words: &ErrorCounts, chars: &ErrorCounts) -> Metrics {
    Metrics {
        wer: words.error_rate(),
        cer: chars.error_rate(),
        custom_wer: words.custom_error_rate(),
        insertions: words.insertions,
        deletions: words.deletions,
        substitutions: words.substitutions,
        critical_substitutions: words.critical_substitutions,
        reference_word_count: words.reference_count,
        char_errors: chars.errors(),
        reference_char_count: chars.reference_count,
    }
}

pub fn character_alignment(reference_text: &str, hypothesis_text: &str) -> Alignment {
    align(&tokenize_chars(reference_text), &tokenize_chars(hypothesis_text))
}

/// Percentage with a zero denominator defined as 0.
pub fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

impl Alignment {
    /// Copy of this alignment whose substitutions carry the resolver's verdict.
    pub fn with_critical_flags<R>(&self, resolver: &R) -> Alignment
    where
        R: CriticalResolver + ?Sized,
    {
        let operations = self
            .iter()
            .cloned()
            .map(|op| match op {
                Operation::Substitution {
                    reference,
                    hypothesis,
                    ..
                } => {
                    let critical = resolver.is_critical(hypothesis.original_index);
                    Operation::Substitution {
                        reference,
                        hypothesis,
                        critical,
                    }
                }
                other => other,
            })
            .collect();
        Alignment::new(operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::tokenization::tokenize;
    use crate::pipeline::defaults::Unreviewed;

    fn word_metrics(
        reference: &str,
        hypothesis: &str,
        critical: impl Fn(usize) -> bool,
    ) -> Metrics {
        let alignment = align(&tokenize(reference), &tokenize(hypothesis));
        score(
            &alignment,
            &character_alignment(reference, hypothesis),
            &critical,
        )
    }

    #[test]
    fn identical_transcripts_score_zero() {
        let m = word_metrics("the quick brown fox", "the quick brown fox", |_| false);
        assert_eq!(m.wer, 0.0);
        assert_eq!(m.custom_wer, 0.0);
        assert_eq!(m.cer, 0.0);
        assert_eq!(m.reference_word_count, 4);
    }

    #[test]
    fn non_critical_substitution_is_discounted() {
        let m = word_metrics("a b c", "a x c", |_| false);
        assert_eq!(m.substitutions, 1);
        assert!((m.wer - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.custom_wer, 0.0);
    }

    #[test]
    fn critical_substitution_counts_in_custom_wer() {
        let m = word_metrics("a b c", "a x c", |idx| idx == 1);
        assert_eq!(m.critical_substitutions, 1);
        assert!((m.custom_wer - m.wer).abs() < 1e-12);
    }

    #[test]
    fn insertions_always_count() {
        let m = word_metrics("a b", "a b c", |_| false);
        assert_eq!(m.insertions, 1);
        assert_eq!(m.wer, 50.0);
        assert_eq!(m.custom_wer, 50.0);
    }

    #[test]
    fn empty_reference_yields_zero_rates() {
        let m = word_metrics("", "extra words", |_| true);
        assert_eq!(m.reference_word_count, 0);
        assert_eq!(m.insertions, 2);
        assert_eq!(m.wer, 0.0);
        assert_eq!(m.custom_wer, 0.0);
        assert_eq!(m.cer, 0.0);
    }

    #[test]
    fn extra_insertion_strictly_increases_wer() {
        let base = word_metrics("a b c d", "a x c d", |_| false);
        let more = word_metrics("a b c d", "a x c d e", |_| false);
        assert!(more.wer > base.wer);
        assert!(more.custom_wer > base.custom_wer);
    }

    #[test]
    fn dropped_hypothesis_word_strictly_increases_wer() {
        let base = word_metrics("a b c d", "a x c d", |_| false);
        let fewer = word_metrics("a b c d", "a x d", |_| false);
        assert_eq!((fewer.substitutions, fewer.deletions), (1, 1));
        assert!(fewer.wer > base.wer);
        assert!(fewer.custom_wer > base.custom_wer);
    }

    #[test]
    fn character_alignment_of_disjoint_scripts() {
        let reference = vec!["שלום"; 3000].join(" ");
        let hypothesis = vec!["hello"; 3000].join(" ");
        let counts = ErrorCounts::from_alignment(
            &character_alignment(&reference, &hypothesis),
            &Unreviewed,
        );
        // Each word block pairs four letters and inserts the fifth.
        assert_eq!(counts.reference_count, 3000 * 4 + 2999);
        assert_eq!(counts.substitutions, 3000 * 4);
        assert_eq!(counts.insertions, 3000);
        assert_eq!(counts.deletions, 0);
        assert_eq!(counts.errors(), 15000);
    }

    #[test]
    fn custom_wer_never_exceeds_wer() {
        let cases = [("a b c d", "x y c z w"), ("one two", "one"), ("p q r", "r q p")];
        for (reference, hypothesis) in cases {
            let m = word_metrics(reference, hypothesis, |idx| idx % 2 == 0);
            assert!(m.custom_wer <= m.wer, "{reference} / {hypothesis}");
        }
    }

    #[test]
    fn cer_counts_character_edits() {
        // "cat" -> "cut": one substitution over three characters.
        let m = word_metrics("cat", "cut", |_| false);
        assert_eq!(m.char_errors, 1);
        assert_eq!(m.reference_char_count, 3);
        assert!((m.cer - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn with_critical_flags_marks_only_substitutions() {
        let alignment = align(&tokenize("a b c"), &tokenize("a x c d"));
        let flagged = alignment.with_critical_flags(&|idx: usize| idx == 1);
        let critical: Vec<bool> = flagged
            .iter()
            .filter_map(|op| match op {
                Operation::Substitution { critical, .. } => Some(*critical),
                _ => None,
            })
            .collect();
        assert_eq!(critical, [true]);
        assert_eq!(flagged.len(), alignment.len());
    }

    #[test]
    fn unreviewed_resolver_is_never_critical() {
        let alignment = align(&tokenize("a b"), &tokenize("c d"));
        let counts = ErrorCounts::from_alignment(&alignment, &Unreviewed);
        assert_eq!(counts.substitutions, 2);
        assert_eq!(counts.critical_substitutions, 0);
    }
}
