use crate::error::EvalError;
use crate::types::{IndexRange, Token, TokenRange};

/// Slices `tokens` to the closed interval `[start, end]`.
///
/// Absent bounds default to the full extent and out-of-bounds values clamp
/// to `[0, len - 1]`. Tokens keep their `original_index`, so hypothesis
/// tokens still map back to their review records after slicing.
pub fn restrict_range(
    tokens: &[Token],
    start: Option<i64>,
    end: Option<i64>,
) -> Result<Vec<Token>, EvalError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    let last = tokens.len() - 1;
    let start = start.map_or(0, |s| clamp_index(s, last));
    let end = end.map_or(last, |e| clamp_index(e, last));
    if start > end {
        return Err(EvalError::InvalidRange { start, end });
    }
    Ok(tokens[start..=end].to_vec())
}

pub fn restrict(
    reference: &[Token],
    hypothesis: &[Token],
    range: &TokenRange,
) -> Result<(Vec<Token>, Vec<Token>), EvalError> {
    let reference = restrict_side(reference, &range.reference)?;
    let hypothesis = restrict_side(hypothesis, &range.hypothesis)?;
    Ok((reference, hypothesis))
}

fn restrict_side(tokens: &[Token], range: &IndexRange) -> Result<Vec<Token>, EvalError> {
    if range.is_full() {
        return Ok(tokens.to_vec());
    }
    restrict_range(tokens, range.start, range.end)
}

fn clamp_index(value: i64, last: usize) -> usize {
    if value <= 0 {
        0
    } else {
        usize::try_from(value).map_or(last, |v| v.min(last))
    }
}
