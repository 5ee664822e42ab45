use std::path::PathBuf;
use thiserror::Error;

/// Errors from document text extraction.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// No extractor handles this file type.
    #[error("unsupported document format '{extension}' ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Reading the file failed.
    #[error("failed to read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
