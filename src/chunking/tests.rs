use super::tail_chars as tail_chars_impl;
use super::*;

fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
    ChunkingConfig {
        chunk_size,
        chunk_overlap,
    }
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = split_text("A short note on fiber.", &ChunkingConfig::default())
        .expect("split should succeed");

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, "A short note on fiber.");
    assert_eq!(chunks[0].chunk_index, 0);
}

#[test]
fn empty_text_yields_no_chunks() {
    let chunks = split_text("", &ChunkingConfig::default()).expect("split should succeed");
    assert!(chunks.is_empty());

    let chunks = split_text("  \n\n  ", &ChunkingConfig::default()).expect("split should succeed");
    assert!(chunks.is_empty());
}

#[test]
fn paragraph_breaks_are_preferred() {
    let text = "First paragraph about sodium intake.\n\nSecond paragraph about potassium.";
    let chunks = split_text(text, &config(40, 0)).expect("split should succeed");

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, "First paragraph about sodium intake.");
    assert_eq!(chunks[1].content, "Second paragraph about potassium.");
}

#[test]
fn oversized_paragraph_falls_back_to_sentences() {
    let text = "Limit saturated fat. Choose lean proteins. Prefer whole grains over refined.";
    let chunks = split_text(text, &config(45, 0)).expect("split should succeed");

    assert!(chunks.len() > 1);
    // Sentence boundaries survive: no chunk starts mid-word.
    for chunk in &chunks {
        assert!(!chunk.content.starts_with(' '));
        assert!(chunk.content.chars().count() <= 45);
    }
}

#[test]
fn unbroken_text_is_hard_cut() {
    let text = "x".repeat(100);
    let chunks = split_text(&text, &config(30, 0)).expect("split should succeed");

    assert_eq!(chunks.len(), 4);
    for chunk in &chunks {
        assert!(chunk.content.chars().count() <= 30);
    }
    let total: usize = chunks.iter().map(|c| c.content.chars().count()).sum();
    assert_eq!(total, 100);
}

#[test]
fn adjacent_chunks_overlap() {
    let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
    let chunks = split_text(text, &config(30, 8)).expect("split should succeed");

    assert!(chunks.len() > 1);
    for pair in chunks.windows(2) {
        let tail = tail_chars_impl(&pair[0].content, 8);
        assert!(
            pair[1].content.starts_with(tail.trim_start()),
            "chunk {:?} should start with tail {:?} of the previous chunk",
            pair[1].content,
            tail
        );
    }
}

#[test]
fn chunk_indices_are_sequential() {
    let text = "one two three four five six seven eight nine ten ".repeat(10);
    let chunks = split_text(&text, &config(64, 16)).expect("split should succeed");

    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
    }
}

#[test]
fn split_is_deterministic() {
    let text = "Reduce sodium to 1500 mg daily.\n\nIncrease vegetables and fruits. ".repeat(20);
    let first = split_text(&text, &ChunkingConfig::default()).expect("split should succeed");
    let second = split_text(&text, &ChunkingConfig::default()).expect("split should succeed");
    assert_eq!(first, second);
}

#[test]
fn overlap_must_be_smaller_than_size() {
    let err = split_text("anything", &config(50, 50)).expect_err("config should be rejected");
    assert!(matches!(err, crate::RagError::Config(_)));

    let err = split_text("anything", &config(50, 80)).expect_err("config should be rejected");
    assert!(matches!(err, crate::RagError::Config(_)));
}

#[test]
fn zero_chunk_size_is_rejected() {
    let err = split_text("anything", &config(0, 0)).expect_err("config should be rejected");
    assert!(matches!(err, crate::RagError::Config(_)));
}

#[test]
fn tail_chars_respects_boundaries() {
    assert_eq!(tail_chars_impl("abcdef", 3), "def");
    assert_eq!(tail_chars_impl("abc", 10), "abc");
    assert_eq!(tail_chars_impl("abc", 0), "");
}
