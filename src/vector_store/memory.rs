//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{CodeeError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store. Documents are kept in insertion order.
pub struct MemoryVectorStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Document>>> {
        self.documents
            .read()
            .map_err(|e| CodeeError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Document>>> {
        self.documents
            .write()
            .map_err(|e| CodeeError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.write()?;
        store.extend_from_slice(docs);
        Ok(docs.len())
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.read()?;
        Ok(rank(docs.iter().cloned(), query_embedding, limit, min_score))
    }

    async fn delete_by_source(&self, source_id: &str) -> Result<usize> {
        let mut docs = self.write()?;
        let initial_len = docs.len();
        docs.retain(|doc| doc.source_id != source_id);
        Ok(initial_len - docs.len())
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let docs = self.read()?;

        let mut source_map: HashMap<String, IndexedSource> = HashMap::new();

        for doc in docs.iter() {
            let entry = source_map
                .entry(doc.source_id.clone())
                .or_insert_with(|| IndexedSource {
                    source_id: doc.source_id.clone(),
                    source_kind: doc.source_kind,
                    title: doc.title.clone(),
                    chunk_count: 0,
                    indexed_at: doc.indexed_at,
                });

            entry.chunk_count += 1;
            if doc.indexed_at > entry.indexed_at {
                entry.indexed_at = doc.indexed_at;
            }
        }

        let mut sources: Vec<IndexedSource> = source_map.into_values().collect();
        sources.sort_by(|a, b| a.source_id.cmp(&b.source_id));

        Ok(sources)
    }

    async fn get_by_source(&self, source_id: &str) -> Result<Vec<Document>> {
        let docs = self.read()?;
        let mut result: Vec<Document> = docs
            .iter()
            .filter(|d| d.source_id == source_id)
            .cloned()
            .collect();
        result.sort_by_key(|d| d.chunk_order);
        Ok(result)
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
