//! Per-turn feedback collection.
//!
//! Every answered turn is logged once as a [`PromptRecord`]; the sink hands
//! back a [`PromptId`] that ratings for that turn must reference. Each turn
//! can be rated on four fixed questions with a five-face scale.

mod file;
mod http;

pub use file::FileFeedbackSink;
pub use http::HttpFeedbackSink;

use crate::config::Settings;
use crate::error::{CodeeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Identifier the feedback service assigned to a logged turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(pub String);

impl std::fmt::Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four questions shown under every answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeedbackQuestion {
    #[serde(rename = "q1")]
    Answered,
    #[serde(rename = "q2")]
    Personalized,
    #[serde(rename = "q3")]
    Understandable,
    #[serde(rename = "q4")]
    Examples,
}

impl FeedbackQuestion {
    pub const ALL: [FeedbackQuestion; 4] = [
        FeedbackQuestion::Answered,
        FeedbackQuestion::Personalized,
        FeedbackQuestion::Understandable,
        FeedbackQuestion::Examples,
    ];

    /// Component name the rating is filed under.
    pub fn component(&self) -> &'static str {
        match self {
            FeedbackQuestion::Answered => "q1",
            FeedbackQuestion::Personalized => "q2",
            FeedbackQuestion::Understandable => "q3",
            FeedbackQuestion::Examples => "q4",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            FeedbackQuestion::Answered => {
                "How well do you believe that the chatbot answered your question?"
            }
            FeedbackQuestion::Personalized => {
                "How well did the agent's response take into account your personal background and experience?"
            }
            FeedbackQuestion::Understandable => {
                "How understandable do you believe the agent's response was to you?"
            }
            FeedbackQuestion::Examples => {
                "If there are examples shown to you, how understandable do you believe the examples were to you?"
            }
        }
    }
}

impl std::fmt::Display for FeedbackQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.component())
    }
}

impl FromStr for FeedbackQuestion {
    type Err = CodeeError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        match lowered.strip_prefix('q').unwrap_or(lowered.as_str()) {
            "1" => Ok(FeedbackQuestion::Answered),
            "2" => Ok(FeedbackQuestion::Personalized),
            "3" => Ok(FeedbackQuestion::Understandable),
            "4" => Ok(FeedbackQuestion::Examples),
            _ => Err(CodeeError::InvalidInput(format!(
                "Unknown feedback question '{}'. Use 1-4 or q1-q4",
                s
            ))),
        }
    }
}

/// A five-face rating, 1 (worst) to 5 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FaceRating(u8);

impl FaceRating {
    const FACES: [&'static str; 5] = ["😞", "🙁", "😐", "🙂", "😀"];

    pub fn new(score: u8) -> Result<Self> {
        if (1..=5).contains(&score) {
            Ok(Self(score))
        } else {
            Err(CodeeError::InvalidInput(format!(
                "Rating must be between 1 and 5, got {}",
                score
            )))
        }
    }

    pub fn score(&self) -> u8 {
        self.0
    }

    pub fn face(&self) -> &'static str {
        Self::FACES[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for FaceRating {
    type Error = CodeeError;

    fn try_from(score: u8) -> Result<Self> {
        Self::new(score)
    }
}

impl From<FaceRating> for u8 {
    fn from(rating: FaceRating) -> Self {
        rating.0
    }
}

/// A prompt/response pair sent once to the feedback service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRecord {
    pub session_id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub generation: String,
    pub model: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A single rating of one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub prompt_id: PromptId,
    pub user_id: String,
    pub component: FeedbackQuestion,
    pub feedback_type: String,
    pub score: FaceRating,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn faces(
        prompt_id: PromptId,
        user_id: &str,
        component: FeedbackQuestion,
        score: FaceRating,
        model: &str,
    ) -> Self {
        Self {
            prompt_id,
            user_id: user_id.to_string(),
            component,
            feedback_type: "faces".to_string(),
            score,
            model: model.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Destination for logged turns and their ratings.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Log a turn and return the id ratings must reference.
    async fn log_prompt(&self, record: &PromptRecord) -> Result<PromptId>;

    /// Log one rating.
    async fn log_feedback(&self, record: &FeedbackRecord) -> Result<()>;
}

/// Create the configured feedback sink: HTTP when an endpoint is set,
/// otherwise the local JSONL log.
pub fn create_feedback_sink(settings: &Settings) -> Result<Arc<dyn FeedbackSink>> {
    match &settings.feedback.endpoint {
        Some(endpoint) => Ok(Arc::new(HttpFeedbackSink::new(
            endpoint,
            &settings.feedback.project,
            settings.feedback.token.clone(),
        )?)),
        None => Ok(Arc::new(FileFeedbackSink::new(settings.feedback_log_path()))),
    }
}
