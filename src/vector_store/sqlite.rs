//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity. The
//! course corpus is a few thousand chunks, so a full scan per query is fine.

use super::{rank, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{CodeeError, Result};
use crate::source::SourceKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    source_id TEXT NOT NULL,
    source_kind TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    chunk_order INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_source_id ON documents(source_id);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, source_id, source_kind, title, content, chunk_order, embedding, indexed_at FROM documents";

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CodeeError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let kind_str: String = row.get(2)?;
        let embedding_bytes: Vec<u8> = row.get(6)?;
        let indexed_at_str: String = row.get(7)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source_id: row.get(1)?,
            source_kind: kind_str.parse().unwrap_or(SourceKind::Slide),
            title: row.get(3)?,
            content: row.get(4)?,
            chunk_order: row.get(5)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO documents
                (id, source_id, source_kind, title, content, chunk_order, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;

            for doc in docs {
                stmt.execute(params![
                    doc.id.to_string(),
                    doc.source_id,
                    doc.source_kind.to_string(),
                    doc.title,
                    doc.content,
                    doc.chunk_order,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!("{} ORDER BY seq", SELECT_COLUMNS))?;
        let docs = stmt
            .query_map([], Self::row_to_document)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let results = rank(docs, query_embedding, limit, min_score);
        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_source(&self, source_id: &str) -> Result<usize> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM documents WHERE source_id = ?1",
            params![source_id],
        )?;

        info!("Deleted {} documents for source {}", deleted, source_id);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source_id, source_kind, MIN(title), COUNT(*) AS chunk_count,
                   MAX(indexed_at) AS indexed_at
            FROM documents
            GROUP BY source_id, source_kind
            ORDER BY source_id
            "#,
        )?;

        let sources = stmt
            .query_map([], |row| {
                let kind_str: String = row.get(1)?;
                let indexed_at_str: String = row.get(4)?;
                Ok(IndexedSource {
                    source_id: row.get(0)?,
                    source_kind: kind_str.parse().unwrap_or(SourceKind::Slide),
                    title: row.get(2)?,
                    chunk_count: row.get(3)?,
                    indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(sources)
    }

    #[instrument(skip(self))]
    async fn get_by_source(&self, source_id: &str) -> Result<Vec<Document>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE source_id = ?1 ORDER BY chunk_order, seq",
            SELECT_COLUMNS
        ))?;

        let docs = stmt
            .query_map(params![source_id], Self::row_to_document)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Found {} documents for source {}", docs.len(), source_id);
        Ok(docs)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
