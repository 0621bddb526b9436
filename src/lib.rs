//! Codee - a course tutor for Computer Science Principles
//!
//! Codee indexes the course slide decks and lecture-video transcripts into a
//! vector index, answers student questions grounded in that material, and
//! records per-answer feedback for each participant.
//!
//! # Overview
//!
//! - Ingest `.pptx` decks and YouTube transcripts, clean and chunk them
//! - Embed the chunks and keep them in a SQLite or in-memory index
//! - Answer questions with the three best passages and a short memory of the
//!   conversation
//! - Gate every turn on an API key and a participant number
//! - Log each answer and its four-question face ratings to a feedback service
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `source` - Slide deck and transcript loaders
//! - `cleaning` - Transcript noise removal
//! - `chunking` - Fixed-window chunking with overlap
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction
//! - `ingest` - Load, clean, chunk, embed and index the corpus
//! - `rag` - Retrieval, memory, prompt assembly and the answer chain
//! - `session` - Access gate and per-participant session state
//! - `feedback` - Prompt and rating logging
//! - `tutor` - One gated, logged tutoring turn
//!
//! # Example
//!
//! ```rust,no_run
//! use codee::config::Settings;
//! use codee::embedding::create_embedder;
//! use codee::ingest::IngestPipeline;
//! use codee::source::read_video_ids;
//! use codee::vector_store::create_vector_store;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let embedder = create_embedder(&settings.embedding, "sk-...")?;
//!     let store = create_vector_store(&settings)?;
//!
//!     let video_ids = read_video_ids(&settings.video_ids_file())?;
//!     let pipeline = IngestPipeline::from_settings(&settings, embedder, store)?;
//!     let report = pipeline
//!         .run(Some(&settings.slides_dir()), &video_ids, false)
//!         .await?;
//!     println!("Indexed {} chunks", report.chunks());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cleaning;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod feedback;
pub mod ingest;
pub mod openai;
pub mod rag;
pub mod session;
pub mod source;
pub mod tutor;
pub mod vector_store;

pub use error::{CodeeError, Result};
