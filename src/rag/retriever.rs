//! Passage retrieval for the conversational chain.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Embeds a query and pulls the most similar chunks from the index.
pub struct Retriever {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    min_score: f32,
}

impl Retriever {
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            top_k: 3,
            min_score: f32::NEG_INFINITY,
        }
    }

    /// Set the number of passages returned per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Drop passages scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve the top passages for `query`, best first.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ContextChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let results = self
            .vector_store
            .search_with_threshold(&query_embedding, self.top_k, self.min_score)
            .await?;

        debug!("Retrieved {} passages", results.len());
        Ok(Self::from_results(results))
    }

    /// Build context chunks from raw search results.
    pub fn from_results(results: Vec<SearchResult>) -> Vec<ContextChunk> {
        results.into_iter().map(ContextChunk::from).collect()
    }
}

/// Join passages into the `{{context}}` block of the system prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format passages as a source list for the user.
pub fn format_context_for_display(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            let url_part = chunk
                .url
                .as_ref()
                .map(|u| format!("\n  Link: {}", u))
                .unwrap_or_default();

            format!(
                "{} [{}] (score: {:.2}){}",
                chunk.title, chunk.kind, chunk.score, url_part
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
