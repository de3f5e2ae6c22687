pub mod alignment;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod review;
pub mod types;

pub use alignment::metrics::{character_alignment, score, ErrorCounts};
pub use alignment::operations::align;
pub use alignment::range::{restrict, restrict_range};
pub use alignment::report::{
    aggregate_reports, build_report, compute_case_report, load_cases, CaseReport, EvalCase, Meta,
    Report,
};
pub use alignment::tokenization::{tokenize, tokenize_chars};
pub use cleaning::{clean_transcript, Preset, PresetRegistry};
pub use config::{EvalConfig, PresetDefinition};
pub use error::EvalError;
pub use pipeline::builder::EvaluatorBuilder;
pub use pipeline::runtime::{Evaluation, Evaluator};
pub use pipeline::traits::{CriticalResolver, SequenceAligner, Tokenizer};
pub use review::{
    apply_correction, ReviewAction, ReviewStatus, ReviewSummary, ReviewerId, TrainingFlag,
    TranscriptReview, WordReviewState,
};
pub use types::{
    Alignment, CleanCategory, CleaningResult, IndexRange, Metrics, Operation, Removal, Token,
    TokenRange,
};
