//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings, api_key: Option<&str>) -> anyhow::Result<()> {
    Output::header("Codee Setup");
    println!();
    println!("Welcome to Codee! Let's get the course tutor ready.\n");

    // Step 1: transcript fetcher
    println!("{}", style("Step 1: Checking prerequisites").bold().cyan());
    println!();

    if settings.sources.transcript_dir.is_some() {
        Output::info("Transcripts are read from a local directory; yt-dlp is not needed.");
    } else if std::process::Command::new("yt-dlp")
        .arg("--version")
        .output()
        .is_ok()
    {
        Output::success("yt-dlp is installed!");
    } else {
        Output::warning("yt-dlp was not found. It is needed to fetch video transcripts.");
        println!("    {} {}", style("→").dim(), style(install_hint_ytdlp()).dim());
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Install yt-dlp and run 'codee init' again.");
            return Ok(());
        }
    }

    println!();

    // Step 2: API key
    println!("{}", style("Step 2: Checking API configuration").bold().cyan());
    println!();

    match api_key {
        Some(key) if !key.trim().is_empty() => {
            Output::success("An OpenAI API key was supplied.");
        }
        _ => {
            Output::warning("No OpenAI API key was supplied.");
            println!();
            println!("  Codee needs an OpenAI API key for embeddings and answers.");
            println!("  Pass it with {} or set it in your shell:", style("--api-key").green());
            println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
            println!();
        }
    }

    println!();

    // Step 3: directories and corpus
    println!("{}", style("Step 3: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    let slides_dir = settings.slides_dir();
    if slides_dir.is_dir() {
        Output::info(&format!("Slide directory: {}", slides_dir.display()));
    } else {
        Output::warning(&format!(
            "Slide directory {} does not exist yet. Put the course .pptx decks there.",
            slides_dir.display()
        ));
    }

    let video_ids = settings.video_ids_file();
    if video_ids.is_file() {
        Output::info(&format!("Video id list: {}", video_ids.display()));
    } else {
        Output::warning(&format!(
            "Video id list {} does not exist yet. Add one YouTube id per line.",
            video_ids.display()
        ));
    }

    println!();

    // Step 4: config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("codee config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("codee doctor").cyan());
    println!("  {} Index the slides and videos", style("codee ingest").cyan());
    println!("  {} Start a tutoring session", style("codee chat -p <participant>").cyan());
    println!();
    println!("For more help: {}", style("codee --help").cyan());

    Ok(())
}

/// Platform-specific install hint for yt-dlp.
pub(crate) fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
