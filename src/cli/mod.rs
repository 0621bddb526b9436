//! CLI module for Codee.

pub mod commands;
mod output;
pub mod preflight;
pub(crate) mod stream;

pub use output::Output;
pub use stream::WordStreamer;

use clap::{Parser, Subcommand};

/// Codee - a course tutor for Computer Science Principles
///
/// Indexes the course slides and video transcripts, then answers questions
/// grounded in them and collects per-answer feedback.
#[derive(Parser, Debug)]
#[command(name = "codee")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Participant number
    #[arg(short, long, env = "CODEE_PARTICIPANT", global = true)]
    pub participant: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Codee and write a default configuration
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Index the slide decks and video transcripts
    Ingest {
        /// Directory of .pptx slide decks (defaults to sources.slides_dir)
        #[arg(long)]
        slides: Option<String>,

        /// File of YouTube video ids, one per line (defaults to sources.video_ids_file)
        #[arg(long)]
        videos: Option<String>,

        /// Skip slide decks
        #[arg(long)]
        no_slides: bool,

        /// Skip videos
        #[arg(long)]
        no_videos: bool,

        /// Delete existing entries for each source before indexing it
        #[arg(long)]
        replace: bool,
    },

    /// Start an interactive tutoring session
    Chat,

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// Show the passages the answer was grounded in
        #[arg(short, long)]
        sources: bool,
    },

    /// Search the index for relevant passages
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.0")]
        min_score: f32,
    },

    /// List indexed sources
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "rag.top_k")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingest_flags() {
        let cli = Cli::try_parse_from([
            "codee",
            "ingest",
            "--slides",
            "./decks",
            "--replace",
            "--api-key",
            "sk-test",
        ])
        .unwrap();

        assert_eq!(cli.api_key.as_deref(), Some("sk-test"));
        match cli.command {
            Commands::Ingest {
                slides, replace, ..
            } => {
                assert_eq!(slides.as_deref(), Some("./decks"));
                assert!(replace);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
