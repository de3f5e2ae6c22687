use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cleaning::DEFAULT_PRESET;
use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Fallback preset for callers that choose not to surface `UnknownPreset`.
    #[serde(default = "default_preset")]
    pub default_preset: String,
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f32,
    #[serde(default)]
    pub normalize_case: bool,
    #[serde(default)]
    pub strip_punctuation: bool,
    #[serde(default)]
    pub presets: Vec<PresetDefinition>,
    #[serde(default = "default_outlier_top_n")]
    pub outlier_top_n: usize,
}

/// A named cleaning preset composed from built-in rule names, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetDefinition {
    pub name: String,
    pub rules: Vec<String>,
}

impl EvalConfig {
    pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f32 = 0.5;
    pub const DEFAULT_OUTLIER_TOP_N: usize = 20;

    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| EvalError::io("read eval config", e))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, EvalError> {
        let config: Self =
            serde_json::from_str(data).map_err(|e| EvalError::json("parse eval config", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EvalError> {
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(EvalError::invalid_config(format!(
                "low_confidence_threshold must be within [0, 1], got {}",
                self.low_confidence_threshold
            )));
        }
        Ok(())
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            default_preset: default_preset(),
            low_confidence_threshold: Self::DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            normalize_case: false,
            strip_punctuation: false,
            presets: Vec::new(),
            outlier_top_n: Self::DEFAULT_OUTLIER_TOP_N,
        }
    }
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

fn default_low_confidence_threshold() -> f32 {
    EvalConfig::DEFAULT_LOW_CONFIDENCE_THRESHOLD
}

fn default_outlier_top_n() -> usize {
    EvalConfig::DEFAULT_OUTLIER_TOP_N
}
