//! Configuration settings for Codee.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub sources: SourceSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub rag: RagSettings,
    pub access: AccessSettings,
    pub feedback: FeedbackSettings,
    pub chat: ChatSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.codee".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Where the course corpus lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Directory holding the `.pptx` slide decks.
    pub slides_dir: String,
    /// File listing one YouTube video id (or URL) per line.
    pub video_ids_file: String,
    /// Directory of pre-fetched `<id>.vtt` / `<id>.txt` transcripts.
    /// When unset, transcripts are fetched with yt-dlp.
    pub transcript_dir: Option<String>,
    /// Subtitle language requested from YouTube.
    pub subtitle_lang: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            slides_dir: "./slides".to_string(),
            video_ids_file: "./video_ids.txt".to_string(),
            transcript_dir: None,
            subtitle_lang: "en".to_string(),
        }
    }
}

/// Text splitter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by adjacent chunks of one source.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 100,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai, hashing).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.codee/index.db".to_string(),
        }
    }
}

/// Conversational chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Chat completion model.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Number of passages retrieved per turn.
    pub top_k: usize,
    /// Number of past exchanges kept as model context.
    pub memory_window: usize,
    /// Rewrite follow-up questions into standalone ones before retrieval.
    pub condense_question: bool,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.3,
            top_k: 3,
            memory_window: 5,
            condense_question: false,
        }
    }
}

/// Access gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct AccessSettings {
    /// The single API key accepted by this deployment.
    /// When unset, any non-empty key is passed through to the API.
    pub expected_api_key: Option<String>,
}

/// Feedback logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSettings {
    /// Base URL of the feedback service. When unset, records go to `log_path`.
    pub endpoint: Option<String>,
    /// Project name records are filed under.
    pub project: String,
    /// Bearer token for the feedback service.
    pub token: Option<String>,
    /// Local JSONL log used without an endpoint.
    pub log_path: String,
    /// Tags attached to every logged prompt.
    pub tags: Vec<String>,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            project: "codee_a".to_string(),
            token: None,
            log_path: "~/.codee/feedback.jsonl".to_string(),
            tags: vec!["codee_chat".to_string()],
        }
    }
}

/// Interactive chat presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// First assistant message of every session.
    pub greeting: String,
    /// Pause between revealed words, in milliseconds.
    pub word_delay_ms: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            greeting: "Hi student! I'm Codee-A, an intelligent AI for Computer Science Principles. How can I help you today?".to_string(),
            word_delay_ms: 50,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CodeeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codee")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded slide directory.
    pub fn slides_dir(&self) -> PathBuf {
        Self::expand_path(&self.sources.slides_dir)
    }

    /// Get the expanded video id list path.
    pub fn video_ids_file(&self) -> PathBuf {
        Self::expand_path(&self.sources.video_ids_file)
    }

    /// Get the expanded local transcript directory, if configured.
    pub fn transcript_dir(&self) -> Option<PathBuf> {
        self.sources
            .transcript_dir
            .as_deref()
            .map(Self::expand_path)
    }

    /// Get the expanded feedback log path.
    pub fn feedback_log_path(&self) -> PathBuf {
        Self::expand_path(&self.feedback.log_path)
    }
}
