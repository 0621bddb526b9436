//! Overlapping window chunking.
//!
//! Windows are cut at whitespace where possible so retrieval units do not
//! start or end mid-word. The next window always starts exactly
//! `chunk_overlap` characters before the previous one ended.

use super::{Chunker, ChunkingConfig, TextChunk};
use tracing::debug;

/// Character-window chunker with soft word boundaries.
pub struct WindowChunker;

impl WindowChunker {
    pub fn new() -> Self {
        Self
    }

    /// Pick the end of the window starting at `start`.
    ///
    /// Searches back from the hard limit for a position followed by
    /// whitespace, without shrinking the window below half its size or
    /// below what is needed to make progress past the overlap.
    fn window_end(chars: &[char], start: usize, config: &ChunkingConfig) -> usize {
        let hard_end = start + config.chunk_size;
        let min_end = (start + config.chunk_overlap + 1).max(start + config.chunk_size / 2);

        (min_end..=hard_end)
            .rev()
            .find(|&end| chars[end].is_whitespace())
            .unwrap_or(hard_end)
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for WindowChunker {
    fn chunk(&self, text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
        let mut chunks = Vec::new();

        if text.trim().is_empty() {
            return chunks;
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut start = 0;
        let mut order = 0;

        loop {
            // Last window: everything that is left fits.
            if total - start <= config.chunk_size {
                chunks.push(TextChunk {
                    content: chars[start..].iter().collect(),
                    order,
                    start_char: start,
                    end_char: total,
                });
                break;
            }

            // hard_end < total here, so chars[end] is always in bounds
            let end = Self::window_end(&chars, start, config);
            chunks.push(TextChunk {
                content: chars[start..end].iter().collect(),
                order,
                start_char: start,
                end_char: end,
            });

            order += 1;
            start = end - config.chunk_overlap;
        }

        debug!(
            "Window chunker created {} chunks from {} chars",
            chunks.len(),
            total
        );

        chunks
    }
}
