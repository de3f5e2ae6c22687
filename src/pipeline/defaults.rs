use crate::alignment::operations::align;
use crate::alignment::tokenization::{tokenize, tokenize_normalized};
use crate::pipeline::traits::{CriticalResolver, SequenceAligner, Tokenizer};
use crate::types::{Alignment, Token};

pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text)
    }
}

/// Whitespace tokenizer that lowercases and/or strips punctuation per token
/// before comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizingTokenizer {
    pub normalize_case: bool,
    pub strip_punctuation: bool,
}

impl Tokenizer for NormalizingTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize_normalized(text, self.normalize_case, self.strip_punctuation)
    }
}

pub struct MyersSequenceAligner;

impl SequenceAligner for MyersSequenceAligner {
    fn align(&self, reference: &[Token], hypothesis: &[Token]) -> Alignment {
        align(reference, hypothesis)
    }
}

/// Treats every substitution as non-critical: a transcript nobody has
/// reviewed yet has no confirmed-wrong words.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unreviewed;

impl CriticalResolver for Unreviewed {
    fn is_critical(&self, _hypothesis_index: usize) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_tokenizer_tokenize() {
        let tokens = WhitespaceTokenizer.tokenize("Hello  world");
        assert_eq!(tokens, tokenize("Hello  world"));
    }

    #[test]
    fn normalizing_tokenizer_applies_flags() {
        let tokenizer = NormalizingTokenizer {
            normalize_case: true,
            strip_punctuation: true,
        };
        let words: Vec<String> = tokenizer
            .tokenize("Hello, World!")
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(words, ["hello", "world"]);
    }

    #[test]
    fn myers_sequence_aligner_align() {
        let reference = tokenize("a b c");
        let hypothesis = tokenize("a x c");
        let aligner = MyersSequenceAligner;
        assert_eq!(
            aligner.align(&reference, &hypothesis),
            align(&reference, &hypothesis)
        );
    }

    #[test]
    fn unreviewed_is_never_critical() {
        assert!(!Unreviewed.is_critical(0));
        assert!(!Unreviewed.is_critical(usize::MAX));
    }
}
