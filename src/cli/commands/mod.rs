//! CLI command implementations.

pub mod ask;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod ingest;
pub mod init;
pub mod list;
pub mod search;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use ingest::{run_ingest, IngestOptions};
pub use init::run_init;
pub use list::run_list;
pub use search::run_search;

use crate::config::{Prompts, Settings};
use crate::embedding::create_embedder;
use crate::feedback::create_feedback_sink;
use crate::rag::ConversationalChain;
use crate::session::AccessGate;
use crate::tutor::Tutor;
use crate::vector_store::create_vector_store;

/// Wire the configured index, model and feedback sink into a tutor.
pub(crate) fn build_tutor(settings: &Settings, api_key: Option<&str>) -> crate::Result<Tutor> {
    let key = api_key.unwrap_or_default();
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let embedder = create_embedder(&settings.embedding, key)?;
    let store = create_vector_store(settings)?;
    let chain = ConversationalChain::from_settings(&settings.rag, prompts, store, embedder, key)?;
    let feedback = create_feedback_sink(settings)?;

    Ok(Tutor::new(
        AccessGate::from_settings(&settings.access),
        api_key.map(str::to_string),
        chain,
        feedback,
    )
    .with_tags(settings.feedback.tags.clone()))
}
