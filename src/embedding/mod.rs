//! Embedding generation for semantic search and retrieval.

mod hashing;
mod openai;

pub use hashing::HashingEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::EmbeddingSettings;
use crate::error::{CodeeError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the configured embedder.
pub fn create_embedder(settings: &EmbeddingSettings, api_key: &str) -> Result<Arc<dyn Embedder>> {
    match settings.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIEmbedder::with_config(
            api_key,
            &settings.model,
            settings.dimensions as usize,
        )?)),
        "hashing" => Ok(Arc::new(HashingEmbedder::new(settings.dimensions as usize))),
        other => Err(CodeeError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, hashing",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_embedder() {
        let mut settings = EmbeddingSettings::default();
        assert!(create_embedder(&settings, "sk-test").is_ok());
        assert!(create_embedder(&settings, "").is_err());

        settings.provider = "hashing".to_string();
        let embedder = create_embedder(&settings, "").unwrap();
        assert_eq!(embedder.dimensions(), 1536);

        settings.provider = "word2vec".to_string();
        assert!(create_embedder(&settings, "sk-test").is_err());
    }
}
