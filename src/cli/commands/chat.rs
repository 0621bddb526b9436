//! Interactive tutoring session.

use super::build_tutor;
use crate::cli::{Output, WordStreamer};
use crate::config::Settings;
use crate::feedback::{FaceRating, FeedbackQuestion};
use crate::session::{AccessGate, Session};
use crate::tutor::Tutor;
use console::style;
use std::io::{self, BufRead, Write};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
enum ChatInput {
    Exit,
    Questions,
    Rate {
        question: FeedbackQuestion,
        score: u8,
        turn: Option<usize>,
    },
    Ask(String),
    Invalid(String),
}

const RATE_USAGE: &str = "Usage: /rate <question 1-4> <score 1-5> [turn]";

fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    let mut parts = line.split_whitespace();

    match parts.next() {
        Some("/exit") | Some("/quit") => ChatInput::Exit,
        Some("/questions") => ChatInput::Questions,
        Some("/rate") => {
            let args: Vec<&str> = parts.collect();
            if !(2..=3).contains(&args.len()) {
                return ChatInput::Invalid(RATE_USAGE.to_string());
            }
            let Ok(question) = args[0].parse::<FeedbackQuestion>() else {
                return ChatInput::Invalid(format!("Unknown feedback question '{}'", args[0]));
            };
            let Ok(score) = args[1].parse::<u8>() else {
                return ChatInput::Invalid(RATE_USAGE.to_string());
            };
            let turn = match args.get(2).map(|t| t.parse::<usize>()) {
                None => None,
                Some(Ok(turn)) => Some(turn),
                Some(Err(_)) => return ChatInput::Invalid(RATE_USAGE.to_string()),
            };
            ChatInput::Rate { question, score, turn }
        }
        _ => ChatInput::Ask(line.to_string()),
    }
}

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings, api_key: Option<&str>, participant: Option<&str>) -> anyhow::Result<()> {
    let gate = AccessGate::from_settings(&settings.access);
    if let Err(e) = gate.admit(api_key, participant) {
        Output::notice(&e.to_string());
        return Ok(());
    }
    let participant = participant.unwrap_or_default();

    let tutor = build_tutor(&settings, api_key)?;
    let streamer = WordStreamer::from_settings(&settings.chat);
    let mut session = Session::new(participant, &settings.chat.greeting, settings.rag.memory_window);

    println!("\n{}", style("Codee").bold().cyan());
    println!(
        "{}\n",
        style("Ask about the course, '/rate <q> <1-5> [turn]' to give feedback, '/questions' for the feedback questions, '/exit' to leave.").dim()
    );
    Output::assistant_label(None);
    println!("{}\n", settings.chat.greeting);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            ChatInput::Exit => break,
            ChatInput::Questions => print_questions(),
            ChatInput::Invalid(msg) => Output::warning(&msg),
            ChatInput::Rate { question, score, turn } => {
                rate(&tutor, &mut session, question, score, turn).await;
            }
            ChatInput::Ask(question) => {
                let spinner = Output::spinner("Thinking...");
                let outcome = tutor.ask(&mut session, &question).await;
                spinner.finish_and_clear();

                match outcome {
                    Ok(outcome) => {
                        Output::assistant_label(Some(outcome.turn));
                        streamer.stream(&mut stdout, &outcome.answer).await?;
                        if outcome.prompt_id.is_none() {
                            Output::warning("This answer was not logged, so it cannot be rated.");
                        }
                        println!();
                    }
                    Err(e) if e.is_gate() => Output::notice(&e.to_string()),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    let summary = session.end();
    println!();
    Output::header("Session summary");
    Output::kv("Participant", &summary.participant);
    Output::kv("Turns", &summary.turns.to_string());
    Output::kv("Logged", &summary.logged_turns.to_string());
    Output::kv("Ratings", &summary.ratings.to_string());
    Output::kv(
        "Duration",
        &format!("{}s", (summary.ended_at - summary.started_at).num_seconds()),
    );
    Output::info("Goodbye!");

    Ok(())
}

async fn rate(
    tutor: &Tutor,
    session: &mut Session,
    question: FeedbackQuestion,
    score: u8,
    turn: Option<usize>,
) {
    let turn = turn.unwrap_or_else(|| session.turn_count());
    if turn == 0 {
        Output::warning("Ask a question first, then rate the answer.");
        return;
    }

    let rating = match FaceRating::new(score) {
        Ok(rating) => rating,
        Err(e) => {
            Output::warning(&e.to_string());
            return;
        }
    };

    match tutor.rate(session, turn, question, rating).await {
        Ok(()) => Output::success(&format!(
            "Thanks! Turn {} {} {}",
            turn,
            question,
            rating.face()
        )),
        Err(e) => Output::warning(&e.to_string()),
    }
}

fn print_questions() {
    Output::header("Feedback questions");
    for question in FeedbackQuestion::ALL {
        Output::list_item(&format!("{}: {}", question, question.text()));
    }
    Output::list_item("Scores: 1 😞  2 🙁  3 😐  4 🙂  5 😀");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("/exit\n"), ChatInput::Exit);
        assert_eq!(parse_input("  /questions "), ChatInput::Questions);
        assert_eq!(
            parse_input("What is a loop?\n"),
            ChatInput::Ask("What is a loop?".to_string())
        );
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(
            parse_input("/rate q2 4"),
            ChatInput::Rate {
                question: FeedbackQuestion::Personalized,
                score: 4,
                turn: None
            }
        );
        assert_eq!(
            parse_input("/rate 1 5 3"),
            ChatInput::Rate {
                question: FeedbackQuestion::Answered,
                score: 5,
                turn: Some(3)
            }
        );
    }

    #[test]
    fn test_parse_rate_errors() {
        assert!(matches!(parse_input("/rate"), ChatInput::Invalid(_)));
        assert!(matches!(parse_input("/rate q9 3"), ChatInput::Invalid(_)));
        assert!(matches!(parse_input("/rate q1 lots"), ChatInput::Invalid(_)));
        assert!(matches!(parse_input("/rate q1 3 last"), ChatInput::Invalid(_)));
    }
}
