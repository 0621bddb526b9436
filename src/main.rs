//! Codee CLI entry point.

use anyhow::Result;
use clap::Parser;
use codee::cli::commands::{self, IngestOptions};
use codee::cli::{Cli, Commands};
use codee::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("codee={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = match &config_path {
        Some(path) => Settings::load_from(Some(path))?,
        None => Settings::load()?,
    };

    std::fs::create_dir_all(settings.data_dir())?;

    let api_key = cli.api_key.as_deref();
    let participant = cli.participant.as_deref();

    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings, api_key)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, api_key)?;
        }

        Commands::Ingest {
            slides,
            videos,
            no_slides,
            no_videos,
            replace,
        } => {
            let options = IngestOptions {
                slides: slides.clone(),
                videos: videos.clone(),
                no_slides: *no_slides,
                no_videos: *no_videos,
                replace: *replace,
            };
            commands::run_ingest(options, settings, api_key).await?;
        }

        Commands::Chat => {
            commands::run_chat(settings, api_key, participant).await?;
        }

        Commands::Ask { question, sources } => {
            commands::run_ask(question, *sources, settings, api_key, participant).await?;
        }

        Commands::Search {
            query,
            limit,
            min_score,
        } => {
            commands::run_search(query, *limit, *min_score, settings, api_key).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}
