//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::source::SourceKind;
use crate::vector_store::create_vector_store;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let store = create_vector_store(&settings)?;

    let sources = match store.list_sources().await {
        Ok(sources) => sources,
        Err(e) => {
            Output::error(&format!("Failed to list sources: {}", e));
            return Err(e.into());
        }
    };

    if sources.is_empty() {
        Output::info("Nothing indexed yet. Use 'codee ingest' to index the course material.");
        return Ok(());
    }

    Output::header(&format!("Indexed Sources ({})", sources.len()));
    println!();

    for source in &sources {
        Output::source_info(&source.title, &source.source_id, source.source_kind, source.chunk_count);
    }

    let total_chunks: u32 = sources.iter().map(|s| s.chunk_count).sum();
    let decks = sources.iter().filter(|s| s.source_kind == SourceKind::Slide).count();
    println!();
    Output::kv("Slide decks", &decks.to_string());
    Output::kv("Videos", &(sources.len() - decks).to_string());
    Output::kv("Total chunks", &total_chunks.to_string());

    Ok(())
}
