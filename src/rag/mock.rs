//! Test doubles that count external calls.

use super::model::ChatModel;
use super::prompt::AssembledPrompt;
use crate::embedding::{Embedder, HashingEmbedder};
use crate::error::{CodeeError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Chat model that replays scripted answers and records every prompt.
pub struct MockChatModel {
    answers: Mutex<Vec<Result<String>>>,
    prompts: Mutex<Vec<AssembledPrompt>>,
}

impl MockChatModel {
    /// Answers are handed out in order; once exhausted the model echoes the
    /// question back.
    pub fn new(answers: Vec<Result<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().rev().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(CodeeError::OpenAI("rate limited".to_string()))])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<AssembledPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, prompt: &AssembledPrompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match self.answers.lock().unwrap().pop() {
            Some(answer) => answer,
            None => Ok(format!(
                "echo: {}",
                prompt.question.as_deref().unwrap_or_default()
            )),
        }
    }

    fn model_name(&self) -> &str {
        "mock-gpt"
    }
}

/// Hashing embedder that counts calls.
pub struct CountingEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: HashingEmbedder::new(128),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}
