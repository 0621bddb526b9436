//! Conversation memory.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A user question and the answer it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

impl Exchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Sliding window over the last `k` exchanges.
///
/// Older exchanges fall off the front and are gone for good; the window is
/// the only conversation context the model ever sees.
#[derive(Debug, Clone)]
pub struct MemoryWindow {
    k: usize,
    exchanges: VecDeque<Exchange>,
}

impl MemoryWindow {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            exchanges: VecDeque::with_capacity(k),
        }
    }

    /// Remember an exchange, evicting the oldest once the window is full.
    pub fn push(&mut self, exchange: Exchange) {
        if self.k == 0 {
            return;
        }
        while self.exchanges.len() >= self.k {
            self.exchanges.pop_front();
        }
        self.exchanges.push_back(exchange);
    }

    /// Remembered exchanges, oldest first.
    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// Remembered exchanges flattened into alternating turns, oldest first.
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.exchanges
            .iter()
            .flat_map(|e| {
                [
                    ChatTurn::user(e.question.as_str()),
                    ChatTurn::assistant(e.answer.as_str()),
                ]
            })
            .collect()
    }

    /// Plain-text history in the "Human: / Assistant:" form used by the
    /// condense prompt.
    pub fn as_transcript(&self) -> String {
        self.exchanges
            .iter()
            .map(|e| format!("Human: {}\nAssistant: {}", e.question, e.answer))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn capacity(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_last_k_oldest_first() {
        let mut memory = MemoryWindow::new(5);
        for i in 1..=7 {
            memory.push(Exchange::new(format!("q{}", i), format!("a{}", i)));
        }

        assert_eq!(memory.len(), 5);
        let questions: Vec<&str> = memory.exchanges().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["q3", "q4", "q5", "q6", "q7"]);

        let turns = memory.turns();
        assert_eq!(turns.len(), 10);
        assert_eq!(turns[0], ChatTurn::user("q3"));
        assert_eq!(turns[1], ChatTurn::assistant("a3"));
        assert_eq!(turns[9], ChatTurn::assistant("a7"));
    }

    #[test]
    fn test_zero_window_remembers_nothing() {
        let mut memory = MemoryWindow::new(0);
        memory.push(Exchange::new("q", "a"));
        assert!(memory.is_empty());
        assert!(memory.turns().is_empty());
    }

    #[test]
    fn test_transcript_format() {
        let mut memory = MemoryWindow::new(2);
        memory.push(Exchange::new("What is a list?", "An ordered collection."));
        memory.push(Exchange::new("Give an example", "[1, 2, 3]"));

        assert_eq!(
            memory.as_transcript(),
            "Human: What is a list?\nAssistant: An ordered collection.\nHuman: Give an example\nAssistant: [1, 2, 3]"
        );
    }
}
