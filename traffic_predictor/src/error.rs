use thiserror::Error;
use traffic_pipeline::PipelineError;

/// Everything that can go wrong while answering one form submission.
/// All variants are rendered the same way on the page.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("could not convert string to float: '{value}' (field '{field}')")]
    InvalidNumber { field: &'static str, value: String },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
