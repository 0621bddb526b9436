//! Video transcript sources.
//!
//! Transcripts come from YouTube captions, fetched as WebVTT by yt-dlp, or
//! from a directory of pre-fetched files for offline runs.

use super::{decode_entities, SourceDocument, SourceKind, TranscriptSource};
use crate::error::{CodeeError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, instrument};

/// Fetches YouTube captions with yt-dlp.
pub struct YtDlpTranscriptSource {
    lang: String,
}

impl YtDlpTranscriptSource {
    /// Create a source requesting subtitles in `lang` (e.g. "en").
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
        }
    }

    fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<SourceDocument> {
        let url = Self::watch_url(video_id);
        let work_dir = tempfile::tempdir()?;
        let template = work_dir.path().join("%(id)s.%(ext)s");

        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--skip-download",
                "--write-subs",
                "--write-auto-subs",
                "--sub-langs",
                &self.lang,
                "--sub-format",
                "vtt",
                "--no-warnings",
                "-o",
            ])
            .arg(&template)
            .arg(&url)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CodeeError::ToolNotFound("yt-dlp".to_string())
                } else {
                    CodeeError::SourceLoad {
                        source_id: video_id.to_string(),
                        reason: format!("Failed to run yt-dlp: {}", e),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CodeeError::SourceLoad {
                source_id: video_id.to_string(),
                reason: format!("yt-dlp failed: {}", stderr.trim()),
            });
        }

        let vtt_path = find_subtitle_file(work_dir.path())?.ok_or_else(|| {
            CodeeError::SourceLoad {
                source_id: video_id.to_string(),
                reason: format!("no '{}' captions available", self.lang),
            }
        })?;

        debug!("Reading captions from {}", vtt_path.display());
        let vtt = tokio::fs::read_to_string(&vtt_path).await?;
        let text = parse_vtt(&vtt);
        info!("Fetched transcript for {} ({} chars)", video_id, text.len());

        Ok(SourceDocument {
            source_id: video_id.to_string(),
            kind: SourceKind::Video,
            title: video_id.to_string(),
            origin: url,
            text,
        })
    }
}

fn find_subtitle_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "vtt"))
        .collect();
    found.sort();
    Ok(found.into_iter().next())
}

/// Reads `<id>.vtt` or `<id>.txt` transcripts from a directory.
pub struct DirectoryTranscriptSource {
    dir: PathBuf,
}

impl DirectoryTranscriptSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TranscriptSource for DirectoryTranscriptSource {
    async fn fetch(&self, video_id: &str) -> Result<SourceDocument> {
        let vtt_path = self.dir.join(format!("{}.vtt", video_id));
        let txt_path = self.dir.join(format!("{}.txt", video_id));

        let (path, text) = if vtt_path.is_file() {
            let raw = tokio::fs::read_to_string(&vtt_path).await?;
            (vtt_path, parse_vtt(&raw))
        } else if txt_path.is_file() {
            let raw = tokio::fs::read_to_string(&txt_path).await?;
            (txt_path, raw)
        } else {
            return Err(CodeeError::SourceLoad {
                source_id: video_id.to_string(),
                reason: format!("no transcript file in {}", self.dir.display()),
            });
        };

        Ok(SourceDocument {
            source_id: video_id.to_string(),
            kind: SourceKind::Video,
            title: video_id.to_string(),
            origin: path.display().to_string(),
            text,
        })
    }
}

fn inline_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"))
}

/// Flatten WebVTT captions to plain text, one caption line per line.
///
/// Headers, NOTE/STYLE blocks, cue ids and timings are dropped, inline
/// timestamp/style tags are stripped, and the rolling duplicate lines of
/// auto-generated captions are collapsed.
pub fn parse_vtt(vtt: &str) -> String {
    let normalized = vtt.replace("\r\n", "\n");
    let mut lines: Vec<String> = Vec::new();

    for block in normalized.split("\n\n") {
        let block_lines: Vec<&str> = block.lines().collect();
        let Some(timing_idx) = block_lines.iter().position(|l| l.contains("-->")) else {
            continue;
        };

        for raw in &block_lines[timing_idx + 1..] {
            let stripped = inline_tag_regex().replace_all(raw, "");
            let line = decode_entities(stripped.trim());
            if line.is_empty() {
                continue;
            }
            if lines.last().is_some_and(|last| *last == line) {
                continue;
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTO_CAPTIONS: &str = "WEBVTT\nKind: captions\nLanguage: en\n\n\
00:00:00.000 --> 00:00:02.000 align:start position:0%\n\
[music]\n\n\
00:00:02.000 --> 00:00:04.000 align:start position:0%\n\
[music]\n\
Hello<00:00:02.500><c> everyone</c>\n\n\
NOTE this block is ignored\n\n\
cue-3\n\
00:00:04.000 --> 00:00:06.000\n\
Hello everyone\n\
lists &amp; loops\n";

    #[test]
    fn test_parse_vtt_flattens_captions() {
        assert_eq!(
            parse_vtt(AUTO_CAPTIONS),
            "[music]\nHello everyone\nlists & loops"
        );
    }

    #[test]
    fn test_parse_vtt_handles_crlf() {
        let vtt = "WEBVTT\r\n\r\n1\r\n00:00:00.000 --> 00:00:01.000\r\nAbstraction\r\n";
        assert_eq!(parse_vtt(vtt), "Abstraction");
    }

    #[test]
    fn test_parse_vtt_empty() {
        assert_eq!(parse_vtt("WEBVTT\n\n"), "");
    }

    #[tokio::test]
    async fn test_directory_source_prefers_vtt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("aaaaaaaaaaa.vtt"), AUTO_CAPTIONS).unwrap();
        std::fs::write(dir.path().join("aaaaaaaaaaa.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("bbbbbbbbbbb.txt"), "[music] Hello [Laughing] world").unwrap();

        let source = DirectoryTranscriptSource::new(dir.path());

        let vtt_doc = source.fetch("aaaaaaaaaaa").await.unwrap();
        assert_eq!(vtt_doc.kind, SourceKind::Video);
        assert!(vtt_doc.text.contains("lists & loops"));

        let txt_doc = source.fetch("bbbbbbbbbbb").await.unwrap();
        assert_eq!(txt_doc.text, "[music] Hello [Laughing] world");
    }

    #[tokio::test]
    async fn test_directory_source_missing_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryTranscriptSource::new(dir.path());

        let err = source.fetch("ccccccccccc").await.unwrap_err();
        assert!(matches!(err, CodeeError::SourceLoad { ref source_id, .. } if source_id == "ccccccccccc"));
    }
}
