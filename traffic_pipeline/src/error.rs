use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("dataset has no usable rows")]
    EmptyDataset,

    #[error("feature '{0}' has no observed values to fit on")]
    EmptyFeature(&'static str),

    #[error("feature length mismatch: got {got}, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("model error: {0}")]
    Model(String),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("artifact {file}: {reason}")]
    Artifact { file: String, reason: String },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn artifact(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Artifact {
            file: file.into(),
            reason: reason.into(),
        }
    }
}
