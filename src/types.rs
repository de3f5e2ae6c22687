use serde::{Deserialize, Serialize};

/// A single unit of a transcript. `original_index` is the token's position in
/// the tokenizer output, not a character offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub original_index: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, original_index: usize) -> Self {
        Self {
            text: text.into(),
            original_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Correct {
        reference: Token,
        hypothesis: Token,
    },
    Substitution {
        reference: Token,
        hypothesis: Token,
        /// Set only by a reviewer-backed resolver; `false` until then.
        critical: bool,
    },
    Insertion {
        hypothesis: Token,
    },
    Deletion {
        reference: Token,
    },
}

impl Operation {
    pub fn reference(&self) -> Option<&Token> {
        match self {
            Self::Correct { reference, .. }
            | Self::Substitution { reference, .. }
            | Self::Deletion { reference } => Some(reference),
            Self::Insertion { .. } => None,
        }
    }

    pub fn hypothesis(&self) -> Option<&Token> {
        match self {
            Self::Correct { hypothesis, .. }
            | Self::Substitution { hypothesis, .. }
            | Self::Insertion { hypothesis } => Some(hypothesis),
            Self::Deletion { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Correct { .. })
    }
}

/// Ordered edit operations between a reference and a hypothesis.
///
/// Reading the present reference tokens in order reconstructs the (possibly
/// range-restricted) reference sequence; the same holds for hypothesis tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alignment {
    operations: Vec<Operation>,
}

impl Alignment {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn reference_tokens(&self) -> Vec<&Token> {
        self.operations.iter().filter_map(Operation::reference).collect()
    }

    pub fn hypothesis_tokens(&self) -> Vec<&Token> {
        self.operations.iter().filter_map(Operation::hypothesis).collect()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

impl<'a> IntoIterator for &'a Alignment {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Closed token-index interval. Absent bounds mean the full extent; bounds
/// are signed so callers can pass unclamped values straight from a UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexRange {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

impl IndexRange {
    pub const FULL: Self = Self {
        start: None,
        end: None,
    };

    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenRange {
    #[serde(default)]
    pub reference: IndexRange,
    #[serde(default)]
    pub hypothesis: IndexRange,
}

/// Error counts and rates for one reference/hypothesis pair. Rates are
/// percentages and are left unrounded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub wer: f64,
    pub cer: f64,
    pub custom_wer: f64,
    pub insertions: usize,
    pub deletions: usize,
    pub substitutions: usize,
    pub critical_substitutions: usize,
    pub reference_word_count: usize,
    pub char_errors: usize,
    pub reference_char_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub rule_name: String,
    pub original_snippet_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanCategory {
    Excellent,
    Good,
    Moderate,
    Low,
    Poor,
}

impl CleanCategory {
    pub fn from_rate(rate: u32) -> Self {
        match rate {
            90.. => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Moderate,
            25..=49 => Self::Low,
            _ => Self::Poor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningResult {
    pub cleaned_text: String,
    pub removals: Vec<Removal>,
    pub original_char_count: usize,
    pub cleaned_char_count: usize,
    /// `None` when the input was empty: retention is not computable.
    pub clean_rate: Option<u32>,
    pub category: Option<CleanCategory>,
}
