use crate::types::Token;

/// Splits on Unicode whitespace runs. Empty input yields no tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .enumerate()
        .map(|(idx, word)| Token::new(word, idx))
        .collect()
}

/// Word tokenization with optional comparison normalization. Tokens that
/// normalize to nothing (e.g. a lone "--" with punctuation stripping) are
/// dropped before indices are assigned.
pub fn tokenize_normalized(
    text: &str,
    normalize_case: bool,
    strip_punctuation: bool,
) -> Vec<Token> {
    if !normalize_case && !strip_punctuation {
        return tokenize(text);
    }

    text.split_whitespace()
        .filter_map(|word| {
            let word = if strip_punctuation {
                word.chars().filter(|c| c.is_alphanumeric()).collect::<String>()
            } else {
                word.to_string()
            };
            let word = if normalize_case {
                word.to_lowercase()
            } else {
                word
            };
            (!word.is_empty()).then_some(word)
        })
        .enumerate()
        .map(|(idx, word)| Token::new(word, idx))
        .collect()
}

/// Character tokens for CER: whitespace runs collapse to one space and the
/// text is trimmed, then every char (separating spaces included) is a token.
pub fn tokenize_chars(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (word_idx, word) in text.split_whitespace().enumerate() {
        if word_idx > 0 {
            let idx = tokens.len();
            tokens.push(Token::new(" ", idx));
        }
        for c in word.chars() {
            let idx = tokens.len();
            tokens.push(Token::new(c.to_string(), idx));
        }
    }
    tokens
}
