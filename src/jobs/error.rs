use std::path::PathBuf;
use thiserror::Error;

use crate::analyzer::AnalysisError;

/// Durable job store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("job serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("job '{id}' not found in store")]
    NotFound { id: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Job lifecycle failures surfaced to callers.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job '{id}' not found")]
    NotFound { id: String },

    /// Evaluate was requested while a run is in flight.
    #[error("job '{id}' is already processing")]
    AlreadyProcessing { id: String },

    /// Raised before the job is touched, e.g. for unknown frameworks.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type JobResult<T> = Result<T, JobError>;
