//! Ask command implementation.

use super::build_tutor;
use crate::cli::{Output, WordStreamer};
use crate::config::Settings;
use crate::rag::retriever::format_context_for_display;
use crate::session::{AccessGate, Session};
use anyhow::Result;
use std::io;

/// Run the ask command: one question in a fresh session.
pub async fn run_ask(
    question: &str,
    show_sources: bool,
    settings: Settings,
    api_key: Option<&str>,
    participant: Option<&str>,
) -> Result<()> {
    let gate = AccessGate::from_settings(&settings.access);
    if let Err(e) = gate.check(api_key, participant, question) {
        Output::notice(&e.to_string());
        return Ok(());
    }
    let participant = participant.unwrap_or_default();

    let tutor = build_tutor(&settings, api_key)?;
    let mut session = Session::new(participant, &settings.chat.greeting, settings.rag.memory_window);

    let spinner = Output::spinner("Searching course material...");
    let outcome = tutor.ask(&mut session, question).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(outcome) => {
            Output::assistant_label(Some(outcome.turn));
            WordStreamer::from_settings(&settings.chat)
                .stream(&mut io::stdout(), &outcome.answer)
                .await?;

            if show_sources && !outcome.sources.is_empty() {
                println!();
                Output::header("Sources");
                println!("{}", format_context_for_display(&outcome.sources));
            }
            if outcome.prompt_id.is_none() {
                Output::warning("This answer was not logged, so it cannot be rated.");
            }
        }
        Err(e) if e.is_gate() => Output::notice(&e.to_string()),
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
