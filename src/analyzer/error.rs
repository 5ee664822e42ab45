use thiserror::Error;

use crate::controls::RepositoryError;
use crate::document::DocumentError;

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The framework has no loaded control index.
    #[error("framework '{framework}' is not available")]
    FrameworkUnavailable { framework: String },

    /// The control id does not exist in the framework.
    #[error("control '{control_id}' not found in {framework}")]
    ControlNotFound {
        framework: String,
        control_id: String,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result alias for analysis runs.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
