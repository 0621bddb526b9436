//! CLI output formatting utilities.

use crate::rag::ContextChunk;
use crate::source::SourceKind;
use console::{style, Style};
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a gate message: guidance, not a failure.
    pub fn notice(msg: &str) {
        println!("{} {}", style("i").blue().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print an indexed source.
    pub fn source_info(title: &str, id: &str, kind: SourceKind, chunks: u32) {
        println!(
            "  {} {} ({}, {}, {} chunks)",
            style("*").cyan(),
            style(title).bold(),
            style(id).dim(),
            kind,
            chunks
        );
    }

    /// Print a search result.
    pub fn search_result(chunk: &ContextChunk) {
        println!(
            "\n{} {} [{}] (score: {:.2})",
            style(">>").green(),
            style(&chunk.title).bold(),
            style(chunk.kind).cyan(),
            chunk.score
        );
        println!("   {}", content_preview(&chunk.content, 200));
        if let Some(u) = &chunk.url {
            println!("   {}", style(u).dim());
        }
    }

    /// Print the assistant label before an answer.
    pub fn assistant_label(turn: Option<usize>) {
        match turn {
            Some(n) => print!("{} ", style(format!("Codee [{}]:", n)).green().bold()),
            None => print!("{} ", style("Codee:").green().bold()),
        }
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Style for dim text.
    pub fn dim_style() -> Style {
        Style::new().dim()
    }
}

/// Truncate content with ellipsis, on a char boundary.
pub(crate) fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short\ntext", 20), "short text");
        assert_eq!(content_preview("abcdef", 3), "abc...");
        assert_eq!(content_preview("héllo wörld", 4), "héll...");
    }
}
