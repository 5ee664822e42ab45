//! Cross-cutting, shared constants.
//!
//! Score bands appear in three places (status banding, summary labels and the score
//! distribution). Keep the thresholds here so the three never drift apart.

/// Upper bound of every control score.
pub const MAX_SCORE: f64 = 100.0;

/// Lower bound of the `mostly_compliant` band (and the `good` label).
pub const BAND_MOSTLY: f64 = 75.0;
/// Lower bound of the `partially_compliant` band (and the `fair` label).
pub const BAND_PARTIAL: f64 = 50.0;
/// Lower bound of the `minimally_compliant` band (and the `poor` label).
pub const BAND_MINIMAL: f64 = 25.0;
/// Lower bound of the `excellent` summary label.
pub const LABEL_EXCELLENT: f64 = 90.0;

/// Scores strictly below this count towards `needs_attention`.
pub const NEEDS_ATTENTION_BELOW: f64 = BAND_PARTIAL;
/// Scores strictly below this are reported as critical gaps.
pub const CRITICAL_GAP_BELOW: f64 = BAND_MINIMAL;

/// Maximum number of critical gaps kept in a report summary.
pub const MAX_CRITICAL_GAPS: usize = 10;
/// Maximum number of prioritised recommendations kept in a report summary.
pub const MAX_TOP_RECOMMENDATIONS: usize = 15;

/// Longest critical or poor list in a score digest.
pub const DIGEST_LIST_CAP: usize = 10;
/// Control text kept per digest entry, in characters.
pub const DIGEST_TEXT_CHARS: usize = 200;

/// Number of document chunks handed to the evaluator per control.
pub const DEFAULT_RELEVANCE_TOP_K: usize = 5;

/// Stage 1 only sees this many characters of the combined chunks.
pub const RELEVANCE_EXCERPT_CHARS: usize = 1500;
/// Stage 3 only sees this many characters of the full document.
pub const SCORING_EXCERPT_CHARS: usize = 2000;
/// Raw model output kept on a parse failure.
pub const RAW_RESPONSE_KEEP_CHARS: usize = 500;

/// Separator between chunks in the combined evaluator input.
pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Relevance gate: below this score (and not flagged relevant) deeper stages are skipped.
pub const RELEVANCE_GATE_THRESHOLD: f64 = 0.2;

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap carried between chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Default throttle between controls.
pub const DEFAULT_CONTROL_DELAY_MS: u64 = 100;

/// Default model for every tier.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Completion budget per call.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Rounds to one decimal place, the precision used for every reported average.
///
/// Ties go to the even digit, so `57.25` becomes `57.2` and `57.75` becomes `57.8`.
#[inline]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Returns at most the first `max_chars` characters of `text` (char-boundary safe).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1() {
        assert_eq!(round1(57.5), 57.5);
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(0.04), 0.0);
    }

    #[test]
    fn test_round1_ties_to_even() {
        assert_eq!(round1(57.25), 57.2);
        assert_eq!(round1(57.75), 57.8);
        assert_eq!(round1(0.25), 0.2);
        assert_eq!(round1(12.5), 12.5);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("ضوابط", 2), "ضو");
        assert_eq!(truncate_chars("", 5), "");
    }
}
