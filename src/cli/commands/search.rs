//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::rag::Retriever;
use crate::vector_store::create_vector_store;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    settings: Settings,
    api_key: Option<&str>,
) -> Result<()> {
    preflight::check(Operation::Search, &settings, api_key)?;

    let store = create_vector_store(&settings)?;
    let embedder = create_embedder(&settings.embedding, api_key.unwrap_or_default())?;
    let retriever = Retriever::new(store, embedder)
        .with_top_k(limit)
        .with_min_score(min_score);

    let spinner = Output::spinner("Searching...");
    let results = retriever.retrieve(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(chunks) if chunks.is_empty() => {
            Output::warning("No results found matching your query.");
        }
        Ok(chunks) => {
            Output::success(&format!("Found {} results", chunks.len()));
            for chunk in &chunks {
                Output::search_result(chunk);
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
