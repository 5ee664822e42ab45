use super::*;

fn chunk(index: usize, text: &str) -> DocumentChunk {
    DocumentChunk {
        index,
        text: text.to_string(),
        char_start: 0,
        char_end: text.chars().count(),
    }
}

#[test]
fn test_token_set_is_case_insensitive() {
    let tokens = token_set("Access CONTROL access  control\npolicy");
    assert_eq!(tokens.len(), 3);
    assert!(tokens.contains("access"));
    assert!(tokens.contains("policy"));
}

#[test]
fn test_zero_overlap_chunks_are_excluded() {
    let chunks = vec![chunk(0, "weather report"), chunk(1, "password policy")];
    let ranker = RelevanceRanker::default();

    let selected = ranker.select("Password rotation policy", &chunks);

    assert_eq!(selected, vec!["password policy".to_string()]);
}

#[test]
fn test_ranking_descends_with_stable_ties() {
    let chunks = vec![
        chunk(0, "backup"),
        chunk(1, "backup encryption keys"),
        chunk(2, "encryption"),
        chunk(3, "backup encryption"),
    ];
    let ranker = RelevanceRanker::new(10);

    let ranked = ranker.rank("backup encryption keys", &chunks);
    let order: Vec<usize> = ranked.iter().map(|r| r.chunk.index).collect();

    assert_eq!(order, vec![1, 3, 0, 2]);
    assert_eq!(ranked[0].overlap, 3);
}

#[test]
fn test_top_k_truncates() {
    let chunks: Vec<DocumentChunk> = (0..8).map(|i| chunk(i, "incident response")).collect();
    let ranker = RelevanceRanker::new(5);

    let selected = ranker.select("incident response plan", &chunks);

    assert_eq!(selected.len(), 5);
}

#[test]
fn test_empty_control_text_selects_nothing() {
    let chunks = vec![chunk(0, "anything")];
    assert!(RelevanceRanker::default().select("   ", &chunks).is_empty());
}
