//! Ingestion pipeline.
//!
//! Loads every slide deck and video transcript, cleans transcripts, chunks,
//! embeds and appends the chunks to the vector store. All sources are loaded
//! and embedded before anything is written, so a bad source or a failed
//! embedding call aborts the run with the index untouched.

use crate::chunking::{Chunker, ChunkingConfig, TextChunk, WindowChunker};
use crate::cleaning::Cleaner;
use crate::config::Settings;
use crate::embedding::Embedder;
use crate::error::{CodeeError, Result};
use crate::source::{
    DirectoryTranscriptSource, SlideDeckLoader, SourceDocument, SourceKind, TranscriptSource,
    YtDlpTranscriptSource,
};
use crate::vector_store::{Document, VectorStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Per-source line of an ingestion report.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source_id: String,
    pub kind: SourceKind,
    pub title: String,
    pub chunks: usize,
}

/// What an ingestion run did.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub sources: Vec<SourceReport>,
    /// Documents appended to the store.
    pub documents_written: usize,
    /// Documents removed first because `replace` was set.
    pub documents_replaced: usize,
}

impl IngestReport {
    pub fn slide_decks(&self) -> usize {
        self.sources.iter().filter(|s| s.kind == SourceKind::Slide).count()
    }

    pub fn videos(&self) -> usize {
        self.sources.iter().filter(|s| s.kind == SourceKind::Video).count()
    }

    pub fn chunks(&self) -> usize {
        self.sources.iter().map(|s| s.chunks).sum()
    }
}

/// Builds the vector index from the course corpus.
pub struct IngestPipeline {
    slides: SlideDeckLoader,
    transcripts: Arc<dyn TranscriptSource>,
    cleaner: Cleaner,
    chunker: Box<dyn Chunker>,
    chunking: ChunkingConfig,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    show_progress: bool,
}

impl IngestPipeline {
    pub fn new(
        transcripts: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            slides: SlideDeckLoader::new(),
            transcripts,
            cleaner: Cleaner::transcript(),
            chunker: Box::new(WindowChunker::new()),
            chunking,
            embedder,
            vector_store,
            show_progress: false,
        }
    }

    /// Pipeline using the configured transcript source and chunk sizes.
    pub fn from_settings(
        settings: &Settings,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let transcripts: Arc<dyn TranscriptSource> = match settings.transcript_dir() {
            Some(dir) => Arc::new(DirectoryTranscriptSource::new(dir)),
            None => Arc::new(YtDlpTranscriptSource::new(&settings.sources.subtitle_lang)),
        };
        let chunking = ChunkingConfig::try_from(&settings.chunking)?;

        Ok(Self::new(transcripts, embedder, vector_store, chunking))
    }

    /// Show progress bars on stderr.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_cleaner(mut self, cleaner: Cleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    fn progress_bar(&self, len: usize, label: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template(&format!(
                "  {{spinner:.green}} {} [{{bar:30.cyan/blue}}] {{pos}}/{{len}} {{msg}}",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Load every slide deck in `slides_dir` and every transcript in `video_ids`.
    ///
    /// Fails on the first source that cannot be loaded.
    #[instrument(skip(self, video_ids), fields(videos = video_ids.len()))]
    pub async fn load_sources(
        &self,
        slides_dir: Option<&Path>,
        video_ids: &[String],
    ) -> Result<Vec<SourceDocument>> {
        let mut documents = match slides_dir {
            Some(dir) => self.slides.load_dir(dir)?,
            None => Vec::new(),
        };
        info!("Loaded {} slide decks", documents.len());

        let pb = self.progress_bar(video_ids.len(), "Transcripts");
        for video_id in video_ids {
            pb.set_message(video_id.clone());
            documents.push(self.transcripts.fetch(video_id).await?);
            pb.inc(1);
        }
        pb.finish_and_clear();
        info!("Loaded {} transcripts", video_ids.len());

        Ok(documents)
    }

    /// Clean (transcripts only) and chunk one source.
    pub fn prepare(&self, document: &SourceDocument) -> Vec<TextChunk> {
        let text = match document.kind {
            SourceKind::Video => self.cleaner.clean(&document.text),
            SourceKind::Slide => document.text.clone(),
        };
        self.chunker.chunk(&text, &self.chunking)
    }

    /// Load, chunk, embed and index everything.
    ///
    /// With `replace`, entries already stored for each source are deleted
    /// before the new ones are written; otherwise a rerun stores duplicates.
    #[instrument(skip(self, video_ids))]
    pub async fn run(
        &self,
        slides_dir: Option<&Path>,
        video_ids: &[String],
        replace: bool,
    ) -> Result<IngestReport> {
        let sources = self.load_sources(slides_dir, video_ids).await?;
        if sources.is_empty() {
            return Err(CodeeError::InvalidInput(
                "No slide decks or video ids to ingest".to_string(),
            ));
        }

        let prepared: Vec<(SourceDocument, Vec<TextChunk>)> = sources
            .into_iter()
            .map(|doc| {
                let chunks = self.prepare(&doc);
                debug!("{} -> {} chunks", doc.source_id, chunks.len());
                (doc, chunks)
            })
            .collect();

        // Embed everything before touching the index, so a failed embedding
        // call leaves existing entries in place.
        let pb = self.progress_bar(prepared.len(), "Embedding");
        let mut embedded: Vec<(SourceDocument, Vec<Document>)> = Vec::with_capacity(prepared.len());
        for (source, chunks) in prepared {
            pb.set_message(source.source_id.clone());

            let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
            let embeddings = if texts.is_empty() {
                Vec::new()
            } else {
                self.embedder.embed_batch(&texts).await?
            };

            let documents: Vec<Document> = chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| {
                    Document::new(
                        source.source_id.clone(),
                        source.kind,
                        source.title.clone(),
                        chunk.content,
                        chunk.order,
                        embedding,
                    )
                })
                .collect();

            embedded.push((source, documents));
            pb.inc(1);
        }
        pb.finish_and_clear();

        let mut report = IngestReport::default();
        let pb = self.progress_bar(embedded.len(), "Indexing");

        for (source, documents) in embedded {
            pb.set_message(source.source_id.clone());

            if replace {
                report.documents_replaced +=
                    self.vector_store.delete_by_source(&source.source_id).await?;
            }
            if !documents.is_empty() {
                report.documents_written += self.vector_store.upsert_batch(&documents).await?;
            }

            report.sources.push(SourceReport {
                source_id: source.source_id,
                kind: source.kind,
                title: source.title,
                chunks: documents.len(),
            });
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            "Indexed {} documents from {} sources",
            report.documents_written,
            report.sources.len()
        );
        Ok(report)
    }
}
