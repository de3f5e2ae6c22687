use std::path::Path;

use crate::cleaning::PresetRegistry;
use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::pipeline::defaults::{MyersSequenceAligner, NormalizingTokenizer, WhitespaceTokenizer};
use crate::pipeline::runtime::{Evaluator, EvaluatorParts};
use crate::pipeline::traits::{SequenceAligner, Tokenizer};

pub struct EvaluatorBuilder {
    config: EvalConfig,
    tokenizer: Option<Box<dyn Tokenizer>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
}

impl EvaluatorBuilder {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            tokenizer: None,
            sequence_aligner: None,
        }
    }

    pub fn from_config_path(path: &Path) -> Result<Self, EvalError> {
        Ok(Self::new(EvalConfig::load(path)?))
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn build(self) -> Result<Evaluator, EvalError> {
        let presets = PresetRegistry::with_definitions(&self.config.presets)?;
        if !presets.contains(&self.config.default_preset) {
            return Err(EvalError::invalid_config(format!(
                "default_preset '{}' is not a known preset",
                self.config.default_preset
            )));
        }

        let normalize_case = self.config.normalize_case;
        let strip_punctuation = self.config.strip_punctuation;
        let tokenizer = self.tokenizer.unwrap_or_else(|| {
            if normalize_case || strip_punctuation {
                Box::new(NormalizingTokenizer {
                    normalize_case,
                    strip_punctuation,
                })
            } else {
                Box::new(WhitespaceTokenizer)
            }
        });

        tracing::debug!(
            presets = presets.names().collect::<Vec<_>>().join(","),
            default_preset = self.config.default_preset.as_str(),
            normalize_case,
            strip_punctuation,
            "evaluator: built"
        );

        Ok(Evaluator::from_parts(EvaluatorParts {
            config: self.config,
            presets,
            tokenizer,
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(MyersSequenceAligner)),
        }))
    }
}
