//! Chat sessions and the access gate.

use crate::config::AccessSettings;
use crate::error::{CodeeError, Result};
use crate::feedback::{FeedbackQuestion, PromptId};
use crate::rag::{ChatTurn, Exchange, MemoryWindow};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Checks a turn's inputs before anything is sent to an external service.
///
/// Order: credential, participant id, then the query itself.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    expected_api_key: Option<String>,
}

impl AccessGate {
    /// Gate accepting only `expected_api_key`, or any non-empty key when `None`.
    pub fn new(expected_api_key: Option<String>) -> Self {
        Self {
            expected_api_key: expected_api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn from_settings(settings: &AccessSettings) -> Self {
        Self::new(settings.expected_api_key.clone())
    }

    /// Check the credential and participant id.
    pub fn admit(&self, api_key: Option<&str>, participant: Option<&str>) -> Result<()> {
        let api_key = api_key.map(str::trim).unwrap_or_default();
        if api_key.is_empty() {
            return Err(CodeeError::MissingCredential);
        }
        if let Some(expected) = &self.expected_api_key {
            if api_key != expected.trim() {
                return Err(CodeeError::InvalidCredential);
            }
        }

        if participant.map(str::trim).unwrap_or_default().is_empty() {
            return Err(CodeeError::MissingParticipant);
        }
        Ok(())
    }

    /// Full per-turn check.
    pub fn check(&self, api_key: Option<&str>, participant: Option<&str>, query: &str) -> Result<()> {
        self.admit(api_key, participant)?;
        if query.trim().is_empty() {
            return Err(CodeeError::EmptyQuery);
        }
        Ok(())
    }
}

/// Totals reported when a session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: Uuid,
    pub participant: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Answered turns.
    pub turns: usize,
    /// Turns that received a prompt id.
    pub logged_turns: usize,
    pub ratings: usize,
}

/// One participant's conversation with the tutor.
///
/// Turn `n` (1-based) is the n-th answered question; the greeting is not a
/// turn. A turn can be rated once it has a prompt id, and each of its four
/// questions only once.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    participant: String,
    started_at: DateTime<Utc>,
    transcript: Vec<ChatTurn>,
    memory: MemoryWindow,
    prompt_ids: Vec<Option<PromptId>>,
    rated: HashSet<(usize, FeedbackQuestion)>,
}

impl Session {
    pub fn new(participant: &str, greeting: &str, memory_window: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            participant: participant.trim().to_string(),
            started_at: Utc::now(),
            transcript: vec![ChatTurn::assistant(greeting)],
            memory: MemoryWindow::new(memory_window),
            prompt_ids: Vec::new(),
            rated: HashSet::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn participant(&self) -> &str {
        &self.participant
    }

    /// Everything said so far, greeting first.
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn memory(&self) -> &MemoryWindow {
        &self.memory
    }

    /// Number of answered turns.
    pub fn turn_count(&self) -> usize {
        self.prompt_ids.len()
    }

    /// Append an answered question. Returns its turn number.
    pub fn record_exchange(&mut self, question: &str, answer: &str) -> usize {
        self.transcript.push(ChatTurn::user(question));
        self.transcript.push(ChatTurn::assistant(answer));
        self.memory.push(Exchange::new(question, answer));
        self.prompt_ids.push(None);
        self.prompt_ids.len()
    }

    /// Record the id the feedback service assigned to `turn`.
    pub fn attach_prompt_id(&mut self, turn: usize, prompt_id: PromptId) -> Result<()> {
        let slot = turn
            .checked_sub(1)
            .and_then(|i| self.prompt_ids.get_mut(i))
            .ok_or_else(|| CodeeError::InvalidInput(format!("No turn {} in this session", turn)))?;
        *slot = Some(prompt_id);
        Ok(())
    }

    pub fn prompt_id(&self, turn: usize) -> Option<&PromptId> {
        turn.checked_sub(1)
            .and_then(|i| self.prompt_ids.get(i))
            .and_then(Option::as_ref)
    }

    /// The prompt id a rating of `question` on `turn` must reference.
    pub fn feedback_target(&self, turn: usize, question: FeedbackQuestion) -> Result<PromptId> {
        let prompt_id = self
            .prompt_id(turn)
            .cloned()
            .ok_or(CodeeError::FeedbackNotReady(turn))?;

        if self.rated.contains(&(turn, question)) {
            return Err(CodeeError::DuplicateFeedback {
                turn,
                question: question.to_string(),
            });
        }
        Ok(prompt_id)
    }

    /// Remember that `question` on `turn` has been rated.
    pub fn mark_rated(&mut self, turn: usize, question: FeedbackQuestion) {
        self.rated.insert((turn, question));
    }

    /// Whether `question` on `turn` has been rated.
    pub fn is_rated(&self, turn: usize, question: FeedbackQuestion) -> bool {
        self.rated.contains(&(turn, question))
    }

    /// Close the session.
    pub fn end(self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            participant: self.participant,
            started_at: self.started_at,
            ended_at: Utc::now(),
            turns: self.prompt_ids.len(),
            logged_turns: self.prompt_ids.iter().filter(|p| p.is_some()).count(),
            ratings: self.rated.len(),
        }
    }
}
