//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::ingest::IngestPipeline;
use crate::source::read_video_ids;
use crate::vector_store::create_vector_store;
use anyhow::Result;
use std::path::PathBuf;

/// Which sources an ingest run should read.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub slides: Option<String>,
    pub videos: Option<String>,
    pub no_slides: bool,
    pub no_videos: bool,
    pub replace: bool,
}

/// Run the ingest command.
pub async fn run_ingest(options: IngestOptions, settings: Settings, api_key: Option<&str>) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings, api_key) {
        Output::error(&format!("{}", e));
        Output::info("Run 'codee doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let slides_dir = if options.no_slides {
        None
    } else {
        Some(
            options
                .slides
                .as_deref()
                .map(Settings::expand_path)
                .unwrap_or_else(|| settings.slides_dir()),
        )
    };

    let video_ids = if options.no_videos {
        Vec::new()
    } else {
        let ids_path: PathBuf = options
            .videos
            .as_deref()
            .map(Settings::expand_path)
            .unwrap_or_else(|| settings.video_ids_file());
        read_video_ids(&ids_path)?
    };

    Output::header("Indexing course material");
    if let Some(dir) = &slides_dir {
        Output::kv("Slides", &dir.display().to_string());
    }
    Output::kv("Videos", &video_ids.len().to_string());
    if options.replace {
        Output::kv("Mode", "replace existing entries");
    }
    println!();

    let embedder = create_embedder(&settings.embedding, api_key.unwrap_or_default())?;
    let store = create_vector_store(&settings)?;
    let pipeline = IngestPipeline::from_settings(&settings, embedder, store)?.with_progress(true);

    let report = match pipeline
        .run(slides_dir.as_deref(), &video_ids, options.replace)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    };

    for source in &report.sources {
        Output::list_item(&format!(
            "{} [{}] {} chunks",
            source.title, source.kind, source.chunks
        ));
    }
    println!();
    Output::success(&format!(
        "Indexed {} chunks from {} slide decks and {} videos",
        report.chunks(),
        report.slide_decks(),
        report.videos()
    ));
    if report.documents_replaced > 0 {
        Output::kv("Replaced", &report.documents_replaced.to_string());
    }

    Ok(())
}
