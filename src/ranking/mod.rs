//! Lexical relevance ranking of document chunks against a control.
//!
//! This is a cheap overlap filter, not semantic search: score = number of distinct
//! lower-cased whitespace tokens a chunk shares with the control text.

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use crate::constants::DEFAULT_RELEVANCE_TOP_K;
use crate::document::DocumentChunk;

/// Lower-cased, whitespace-separated distinct tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// A chunk together with its overlap score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedChunk<'a> {
    pub chunk: &'a DocumentChunk,
    pub overlap: usize,
}

/// Ranks chunks for a control.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceRanker {
    top_k: usize,
}

impl Default for RelevanceRanker {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANCE_TOP_K)
    }
}

impl RelevanceRanker {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Scores every chunk, drops zero-overlap chunks, and sorts by descending overlap.
    ///
    /// Ties keep document order. The result is not truncated.
    pub fn rank<'a>(&self, control_text: &str, chunks: &'a [DocumentChunk]) -> Vec<RankedChunk<'a>> {
        let control_tokens = token_set(control_text);
        if control_tokens.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<RankedChunk<'a>> = chunks
            .iter()
            .filter_map(|chunk| {
                let overlap = chunk
                    .text
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<HashSet<_>>()
                    .intersection(&control_tokens)
                    .count();
                (overlap > 0).then_some(RankedChunk { chunk, overlap })
            })
            .collect();

        ranked.sort_by(|a, b| b.overlap.cmp(&a.overlap));
        ranked
    }

    /// Returns the texts of the `top_k` most relevant chunks.
    pub fn select(&self, control_text: &str, chunks: &[DocumentChunk]) -> Vec<String> {
        self.rank(control_text, chunks)
            .into_iter()
            .take(self.top_k)
            .map(|r| r.chunk.text.clone())
            .collect()
    }
}
