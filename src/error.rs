//! Error types for Codee.

use thiserror::Error;

/// Library-level error type for Codee operations.
#[derive(Error, Debug)]
pub enum CodeeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Please add your OpenAI API key to continue.")]
    MissingCredential,

    #[error("The API key you entered is not valid for this tutor. Please check it and try again.")]
    InvalidCredential,

    #[error("Please add your Participant # to continue.")]
    MissingParticipant,

    #[error("Please type a question first.")]
    EmptyQuery,

    #[error("Failed to load source {source_id}: {reason}")]
    SourceLoad { source_id: String, reason: String },

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("Feedback service error: {0}")]
    Feedback(String),

    #[error("Turn {0} has not been logged yet, so it cannot receive feedback")]
    FeedbackNotReady(usize),

    #[error("Question {question} of turn {turn} has already been rated")]
    DuplicateFeedback { turn: usize, question: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Slide archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CodeeError {
    /// Whether this error blocks the turn before any external call is made.
    ///
    /// These are shown to the user as guidance rather than as failures.
    pub fn is_gate(&self) -> bool {
        matches!(
            self,
            CodeeError::MissingCredential
                | CodeeError::InvalidCredential
                | CodeeError::MissingParticipant
                | CodeeError::EmptyQuery
        )
    }
}

/// Result type alias for Codee operations.
pub type Result<T> = std::result::Result<T, CodeeError>;
