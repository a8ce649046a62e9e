// Content chunking
// Splits raw document text into overlapping passages sized for embedding.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::{RagError, Result};

/// A bounded excerpt of a source document produced by splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// The passage text
    pub content: String,
    /// The index of this chunk within the document
    pub chunk_index: usize,
}

/// Configuration for content chunking. Sizes are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size
    pub chunk_size: usize,
    /// Overlap carried from the tail of each chunk into the next
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}

impl ChunkingConfig {
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Separator ladder, most to least semantic. Each separator is only used
/// when the previous one cannot cut a piece down to the size budget; the
/// final empty separator cuts at character boundaries.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

/// Split document text into overlapping chunks.
///
/// The whole document is materialized in memory; output is deterministic
/// for a given input and configuration.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Result<Vec<DocumentChunk>> {
    config.validate()?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let segments = split_recursive(text, SEPARATORS, config.chunk_size);
    let merged = merge_segments(&segments, config);

    Ok(merged
        .into_iter()
        .enumerate()
        .map(|(chunk_index, content)| DocumentChunk {
            content,
            chunk_index,
        })
        .collect())
}

/// Break text into segments no longer than `limit`, descending the
/// separator ladder only for pieces that remain oversized.
fn split_recursive(text: &str, separators: &[&str], limit: usize) -> Vec<String> {
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }

    let Some((separator, rest)) = separators.split_first() else {
        return vec![text.to_string()];
    };

    if separator.is_empty() {
        return hard_cut(text, limit);
    }

    let mut segments = Vec::new();
    for part in text.split_inclusive(separator) {
        if char_len(part) <= limit {
            segments.push(part.to_string());
        } else {
            segments.extend(split_recursive(part, rest, limit));
        }
    }

    segments
}

/// Pack segments into chunks up to the size budget, seeding each new chunk
/// with the overlap tail of the one just finished.
fn merge_segments(segments: &[String], config: &ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for segment in segments {
        let segment_len = char_len(segment);

        if current_len + segment_len > config.chunk_size && !current.trim().is_empty() {
            let finished = current.trim().to_string();
            let overlap = tail_chars(&finished, config.chunk_overlap);
            chunks.push(finished);
            current_len = char_len(&overlap);
            current = overlap;
        }

        current.push_str(segment);
        current_len += segment_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}

/// Cut text into fixed-size character windows; last resort for text with no
/// usable separator.
fn hard_cut(text: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut buffer = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        buffer.push(ch);
        count += 1;
        if count == limit {
            pieces.push(std::mem::take(&mut buffer));
            count = 0;
        }
    }

    if !buffer.is_empty() {
        pieces.push(buffer);
    }

    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of a string, on character boundaries.
fn tail_chars(s: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let skip = s.chars().count().saturating_sub(n);
    s.chars().skip(skip).collect()
}
