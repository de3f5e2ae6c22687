use crate::types::{Alignment, Token};

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

pub trait SequenceAligner: Send + Sync {
    fn align(&self, reference: &[Token], hypothesis: &[Token]) -> Alignment;
}

/// Decides whether the substitution at a hypothesis token index was
/// confirmed wrong by a reviewer.
pub trait CriticalResolver {
    fn is_critical(&self, hypothesis_index: usize) -> bool;
}

impl<F> CriticalResolver for F
where
    F: Fn(usize) -> bool,
{
    fn is_critical(&self, hypothesis_index: usize) -> bool {
        self(hypothesis_index)
    }
}
