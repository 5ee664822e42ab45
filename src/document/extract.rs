use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::chunking::{DocumentChunk, chunk_text};
use super::error::{DocumentError, DocumentResult};

/// Upload extensions accepted by the gateway.
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "docx"];

/// Extensions [`PlainTextDocuments`] can read.
pub const PLAIN_TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Lower-cased extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Returns `true` if uploads with this file name are accepted.
pub fn is_allowed_upload(filename: &str) -> bool {
    extension_of(Path::new(filename)).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

#[async_trait]
/// Turns an uploaded file into text and text into chunks.
pub trait DocumentService: Send + Sync {
    /// Extracts the full text of the document at `path`.
    async fn extract_text(&self, path: &Path) -> DocumentResult<String>;

    /// Splits `text` into overlapping chunks.
    fn chunk_text(&self, text: &str, size: usize, overlap: usize) -> Vec<DocumentChunk> {
        chunk_text(text, size, overlap)
    }
}

/// Extractor for UTF-8 text formats (`.txt`, `.md`). Invalid UTF-8 is replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextDocuments;

#[async_trait]
impl DocumentService for PlainTextDocuments {
    async fn extract_text(&self, path: &Path) -> DocumentResult<String> {
        let extension = extension_of(path).unwrap_or_default();
        if !PLAIN_TEXT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(DocumentError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DocumentError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        debug!(path = %path.display(), chars = text.len(), "Extracted document text");
        Ok(text)
    }
}
