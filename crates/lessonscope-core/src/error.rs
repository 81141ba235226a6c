//! Analysis error types.
//!
//! The parser itself never fails; these cover the pipeline around it.

use thiserror::Error;

/// Errors raised by the analysis pipeline before or around the model call.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The user supplied no assessment data.
    #[error("assessment data is empty; enter your assessment data before generating an analysis")]
    EmptyInput,

    /// The provider listed no models for this API key.
    #[error("no suitable models found for this API key")]
    NoModelsAvailable,

    /// No API key was configured.
    #[error("{0} API key not found; set it in the config file or the {1} environment variable")]
    MissingApiKey(String, String),
}
