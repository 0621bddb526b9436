//! Vector store abstraction for Codee.
//!
//! Provides a trait-based interface for different vector database backends.
//! Stores are append-only: every chunk gets a fresh id, so indexing the same
//! source twice stores it twice unless its entries are deleted first.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::Settings;
use crate::error::{CodeeError, Result};
use crate::source::SourceKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Slide file name or video id this chunk was cut from.
    pub source_id: String,
    /// Type of source.
    pub source_kind: SourceKind,
    /// Source title.
    pub title: String,
    /// Text content of this chunk.
    pub content: String,
    /// Order of this chunk in its source.
    pub chunk_order: i32,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(
        source_id: String,
        source_kind: SourceKind,
        title: String,
        content: String,
        chunk_order: i32,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            source_kind,
            title,
            content,
            chunk_order,
            embedding,
            indexed_at: Utc::now(),
        }
    }

    /// Link back to the source, when it has one.
    pub fn source_url(&self) -> Option<String> {
        match self.source_kind {
            SourceKind::Video => Some(format!(
                "https://youtube.com/watch?v={}",
                self.source_id
            )),
            SourceKind::Slide => None,
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    pub source_id: String,
    pub source_kind: SourceKind,
    pub title: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// When the source was last indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append documents. Returns the number written.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Search for the `limit` most similar documents.
    ///
    /// Results are ordered by score; equal scores keep insertion order.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::NEG_INFINITY)
            .await
    }

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete documents by source id.
    async fn delete_by_source(&self, source_id: &str) -> Result<usize>;

    /// List all indexed sources.
    async fn list_sources(&self) -> Result<Vec<IndexedSource>>;

    /// Get all documents for a source, in chunk order.
    async fn get_by_source(&self, source_id: &str) -> Result<Vec<Document>>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
}

/// Create the configured vector store.
pub fn create_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    match settings.vector_store.provider.as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?)),
        "memory" => Ok(Arc::new(MemoryVectorStore::new())),
        other => Err(CodeeError::Config(format!(
            "Unknown vector store provider: '{}'. Supported providers: sqlite, memory",
            other
        ))),
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score `docs` (in insertion order) against a query and keep the best.
///
/// The sort is stable, so ties stay in insertion order.
pub(crate) fn rank(
    docs: impl IntoIterator<Item = Document>,
    query_embedding: &[f32],
    limit: usize,
    min_score: f32,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = docs
        .into_iter()
        .map(|doc| {
            let score = cosine_similarity(query_embedding, &doc.embedding);
            SearchResult {
                document: doc,
                score,
            }
        })
        .filter(|r| r.score >= min_score)
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(limit);
    results
}
