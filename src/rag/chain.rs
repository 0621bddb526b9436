//! The conversational retrieval chain.

use super::memory::{Exchange, MemoryWindow};
use super::model::{ChatModel, OpenAIChatModel};
use super::prompt::PromptAssembler;
use super::retriever::Retriever;
use super::ContextChunk;
use crate::config::{Prompts, RagSettings};
use crate::embedding::Embedder;
use crate::error::{CodeeError, Result};
use crate::vector_store::VectorStore;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The outcome of one chain run.
#[derive(Debug, Clone)]
pub struct ChainResponse {
    pub answer: String,
    /// The question used for retrieval (differs from the input only when
    /// condensing is on).
    pub standalone_question: String,
    pub sources: Vec<ContextChunk>,
}

/// Memory window + retriever + prompt assembler + chat model.
pub struct ConversationalChain {
    retriever: Retriever,
    assembler: PromptAssembler,
    model: Arc<dyn ChatModel>,
    condense_question: bool,
}

impl ConversationalChain {
    pub fn new(retriever: Retriever, assembler: PromptAssembler, model: Arc<dyn ChatModel>) -> Self {
        Self {
            retriever,
            assembler,
            model,
            condense_question: false,
        }
    }

    /// Rewrite follow-ups into standalone questions before retrieval.
    pub fn with_condense_question(mut self, enabled: bool) -> Self {
        self.condense_question = enabled;
        self
    }

    /// Build the OpenAI-backed chain for a participant's credential.
    pub fn from_settings(
        settings: &RagSettings,
        prompts: Prompts,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        api_key: &str,
    ) -> Result<Self> {
        let model = OpenAIChatModel::new(api_key, settings)?;
        let retriever = Retriever::new(vector_store, embedder).with_top_k(settings.top_k);

        Ok(Self::new(retriever, PromptAssembler::new(prompts), Arc::new(model))
            .with_condense_question(settings.condense_question))
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Answer `question` given the conversation so far. Memory is not touched.
    #[instrument(skip(self, memory), fields(history = memory.len()))]
    pub async fn run(&self, question: &str, memory: &MemoryWindow) -> Result<ChainResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(CodeeError::EmptyQuery);
        }
        debug!(state = "ReceiveQuery");

        let standalone_question = if self.condense_question && !memory.is_empty() {
            let prompt = self.assembler.build_condense(question, memory);
            let condensed = self.model.complete(&prompt).await?;
            let condensed = condensed.trim();
            if condensed.is_empty() {
                question.to_string()
            } else {
                debug!(standalone = %condensed, "Condensed follow-up question");
                condensed.to_string()
            }
        } else {
            question.to_string()
        };

        debug!(state = "RetrieveContext");
        let sources = self.retriever.retrieve(&standalone_question).await?;

        debug!(state = "BuildPrompt", passages = sources.len());
        let prompt = self.assembler.build(&standalone_question, &sources, memory);

        debug!(state = "CallModel", model = self.model.model_name());
        let answer = self.model.complete(&prompt).await?;

        info!("Answered with {} passages", sources.len());
        Ok(ChainResponse {
            answer,
            standalone_question,
            sources,
        })
    }

    /// Answer `question` and remember the exchange on success.
    pub async fn ask(&self, question: &str, memory: &mut MemoryWindow) -> Result<ChainResponse> {
        let response = self.run(question, memory).await?;
        memory.push(Exchange::new(question.trim(), response.answer.as_str()));
        debug!(state = "AppendHistory", remembered = memory.len());
        Ok(response)
    }
}
