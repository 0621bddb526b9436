//! Text chunking for retrieval.
//!
//! Source documents are split into overlapping windows small enough to fit
//! several of them into one prompt.

mod window;

pub use window::WindowChunker;

use crate::config::ChunkingSettings;
use crate::error::{CodeeError, Result};
use serde::{Deserialize, Serialize};

/// A window of text cut from one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Order of this chunk in its source.
    pub order: i32,
    /// Offset of the first character, counted in chars.
    pub start_char: usize,
    /// Offset one past the last character, counted in chars.
    pub end_char: usize,
}

impl TextChunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.end_char - self.start_char
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by adjacent chunks.
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// Create a validated configuration.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(CodeeError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(CodeeError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 100,
        }
    }
}

impl TryFrom<&ChunkingSettings> for ChunkingConfig {
    type Error = CodeeError;

    fn try_from(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }
}

/// Trait for text chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    fn chunk(&self, text: &str, config: &ChunkingConfig) -> Vec<TextChunk>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(ChunkingConfig::new(1500, 100).is_ok());
        assert!(ChunkingConfig::new(0, 0).is_err());
        assert!(ChunkingConfig::new(100, 100).is_err());
        assert!(ChunkingConfig::new(100, 150).is_err());
    }

    #[test]
    fn test_config_from_settings() {
        let config = ChunkingConfig::try_from(&ChunkingSettings::default()).unwrap();
        assert_eq!(config, ChunkingConfig::default());
    }
}
