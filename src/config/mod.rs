//! Configuration module for Codee.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    AccessSettings, ChatSettings, ChunkingSettings, EmbeddingSettings, FeedbackSettings,
    GeneralSettings, PromptSettings, RagSettings, Settings, SourceSettings, VectorStoreSettings,
};
