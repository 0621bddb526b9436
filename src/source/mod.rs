//! Course sources: slide decks and video transcripts.
//!
//! Loaders turn each source into one [`SourceDocument`] holding its full text.
//! Chunking and embedding happen later in the ingestion pipeline.

pub(crate) mod slides;
mod transcript;

pub use slides::SlideDeckLoader;
pub use transcript::{parse_vtt, DirectoryTranscriptSource, YtDlpTranscriptSource};

use crate::error::{CodeeError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Type of course source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Slide,
    Video,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Slide => write!(f, "slide"),
            SourceKind::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slide" | "slides" => Ok(SourceKind::Slide),
            "video" | "youtube" => Ok(SourceKind::Video),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}

/// The full text of one loaded source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Slide file name or YouTube video id.
    pub source_id: String,
    /// Type of source.
    pub kind: SourceKind,
    /// Human-readable title.
    pub title: String,
    /// Path or URL the text came from.
    pub origin: String,
    /// Extracted text.
    pub text: String,
}

/// Trait for video transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript of a video as a source document.
    async fn fetch(&self, video_id: &str) -> Result<SourceDocument>;
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Matches various YouTube URL formats and bare video IDs
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("video id regex is valid")
    })
}

/// Extract a video id from a YouTube URL or bare id.
pub fn parse_video_id(input: &str) -> Option<String> {
    let caps = video_id_regex().captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Read the video id list: one id or URL per line, blank lines and `#`
/// comments ignored. Any unparseable line aborts.
pub fn read_video_ids(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| CodeeError::SourceLoad {
        source_id: path.display().to_string(),
        reason: e.to_string(),
    })?;

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            parse_video_id(line).ok_or_else(|| CodeeError::SourceLoad {
                source_id: line.to_string(),
                reason: "not a YouTube video id or URL".to_string(),
            })
        })
        .collect()
}

/// Decode the XML character references used by pptx and WebVTT text.
pub(crate) fn decode_entities(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);")
            .expect("entity regex is valid")
    });

    re.replace_all(text, |caps: &regex::Captures| {
        let entity = &caps[1];
        match entity {
            "amp" => "&".to_string(),
            "lt" => "<".to_string(),
            "gt" => ">".to_string(),
            "quot" => "\"".to_string(),
            "apos" => "'".to_string(),
            "nbsp" => "\u{a0}".to_string(),
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else {
                    entity[1..].parse::<u32>().ok()
                };
                code.and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string())
            }
        }
    })
    .into_owned()
}
