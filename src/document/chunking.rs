use serde::{Deserialize, Serialize};

const PARAGRAPH_BREAK: &str = "\n\n";

/// A contiguous slice of a document, the unit of relevance ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Position in the chunk sequence.
    pub index: usize,
    /// Trimmed chunk text.
    pub text: String,
    /// Sum of the lengths of all previously emitted chunk texts (in chars).
    pub char_start: usize,
    /// `char_start` plus the untrimmed accumulator length.
    pub char_end: usize,
}

/// Character and word counts of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub char_count: usize,
    pub word_count: usize,
}

/// Counts characters and whitespace-separated words.
pub fn document_stats(text: &str) -> DocumentStats {
    DocumentStats {
        char_count: text.chars().count(),
        word_count: text.split_whitespace().count(),
    }
}

/// Splits `text` into paragraph-aligned chunks of roughly `size` characters.
///
/// Paragraphs are separated by blank lines. A chunk is emitted once appending the next
/// paragraph would push it past `size`; the following chunk then starts with the last
/// `overlap` characters of the emitted one. Offsets are tracked with a running sum, so
/// the whole pass is linear in the document length.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    // Char lengths, tracked alongside the strings to avoid recounting.
    let mut current_len = 0usize;
    let mut emitted_len = 0usize;

    for para in text.split(PARAGRAPH_BREAK) {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        let para_len = para.chars().count();

        if current_len + para_len > size && !current.is_empty() {
            let chunk = emit(&current, current_len, chunks.len(), emitted_len);
            emitted_len += chunk.text.chars().count();
            chunks.push(chunk);

            if overlap > 0 && current_len > overlap {
                let tail = char_tail(&current, current_len, overlap);
                current = format!("{tail}{PARAGRAPH_BREAK}{para}");
                current_len = overlap + PARAGRAPH_BREAK.len() + para_len;
            } else {
                current = para.to_string();
                current_len = para_len;
            }
        } else if current.is_empty() {
            current.push_str(para);
            current_len = para_len;
        } else {
            current.push_str(PARAGRAPH_BREAK);
            current.push_str(para);
            current_len += PARAGRAPH_BREAK.len() + para_len;
        }
    }

    if !current.trim().is_empty() {
        chunks.push(emit(&current, current_len, chunks.len(), emitted_len));
    }

    chunks
}

fn emit(current: &str, current_len: usize, index: usize, char_start: usize) -> DocumentChunk {
    DocumentChunk {
        index,
        text: current.trim().to_string(),
        char_start,
        char_end: char_start + current_len,
    }
}

fn char_tail(text: &str, text_len: usize, n: usize) -> &str {
    match text.char_indices().nth(text_len - n) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}
