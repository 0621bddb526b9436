//! Retrieval-augmented answering over the course corpus.
//!
//! A [`ConversationalChain`] composes a [`MemoryWindow`], a [`Retriever`], a
//! [`PromptAssembler`] and a [`ChatModel`]. Each turn embeds the question,
//! pulls the top passages, renders the tutor's instruction template around
//! them and asks the model.

mod chain;
pub mod memory;
#[cfg(test)]
pub(crate) mod mock;
mod model;
mod prompt;
pub mod retriever;

pub use chain::{ChainResponse, ConversationalChain};
pub use memory::{ChatTurn, Exchange, MemoryWindow, Role};
pub use model::{ChatModel, OpenAIChatModel};
pub use prompt::{AssembledPrompt, PromptAssembler};
pub use retriever::Retriever;

use crate::source::SourceKind;
use crate::vector_store::SearchResult;

/// A retrieved passage with its provenance.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Slide file name or video id.
    pub source_id: String,
    pub title: String,
    pub kind: SourceKind,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
    /// Link to the source (videos only).
    pub url: Option<String>,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        let url = result.document.source_url();
        Self {
            source_id: result.document.source_id,
            title: result.document.title,
            kind: result.document.source_kind,
            content: result.document.content,
            score: result.score,
            url,
        }
    }
}
