use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the control repository.
pub enum RepositoryError {
    /// The requested framework has no loaded control index.
    #[error("framework '{framework}' is not indexed")]
    FrameworkNotIndexed {
        /// Framework id.
        framework: String,
    },

    /// A framework file could not be read.
    #[error("failed to read framework file {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The frameworks directory does not exist.
    #[error("frameworks directory not found: {path}")]
    DirectoryNotFound {
        /// Directory path.
        path: PathBuf,
    },
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
