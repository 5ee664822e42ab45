//! Document text extraction and paragraph chunking.

pub mod chunking;
pub mod error;
pub mod extract;


pub use chunking::{DocumentChunk, DocumentStats, chunk_text, document_stats};
pub use error::{DocumentError, DocumentResult};
pub use extract::{
    ALLOWED_EXTENSIONS, DocumentService, PLAIN_TEXT_EXTENSIONS, PlainTextDocuments, extension_of,
    is_allowed_upload,
};
