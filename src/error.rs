use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid word index {index}: transcript has {len} reviewable positions")]
    InvalidIndex { index: usize, len: usize },
    #[error("unknown cleaning preset '{name}'")]
    UnknownPreset { name: String },
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: usize, end: usize },
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

impl EvalError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn unknown_preset(name: impl Into<String>) -> Self {
        Self::UnknownPreset { name: name.into() }
    }
}
