//! Local JSONL feedback log.

use super::{FeedbackRecord, FeedbackSink, PromptId, PromptRecord};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum LogLine<'a> {
    Prompt {
        id: &'a PromptId,
        #[serde(flatten)]
        record: &'a PromptRecord,
    },
    Feedback {
        #[serde(flatten)]
        record: &'a FeedbackRecord,
    },
}

/// Appends one JSON object per line; prompt ids are fresh UUIDs.
pub struct FileFeedbackSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileFeedbackSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn append(&self, line: &LogLine<'_>) -> Result<()> {
        let mut json = serde_json::to_string(line)?;
        json.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackSink for FileFeedbackSink {
    async fn log_prompt(&self, record: &PromptRecord) -> Result<PromptId> {
        let id = PromptId(Uuid::new_v4().to_string());
        self.append(&LogLine::Prompt { id: &id, record }).await?;
        debug!("Logged prompt {} to {}", id, self.path.display());
        Ok(id)
    }

    async fn log_feedback(&self, record: &FeedbackRecord) -> Result<()> {
        self.append(&LogLine::Feedback { record }).await?;
        debug!("Logged feedback for {} to {}", record.prompt_id, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FaceRating, FeedbackQuestion};
    use chrono::Utc;

    #[tokio::test]
    async fn test_appends_prompt_and_feedback_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileFeedbackSink::new(dir.path().join("logs").join("feedback.jsonl"));

        let record = PromptRecord {
            session_id: Uuid::new_v4(),
            user_id: "7".to_string(),
            prompt: "What is a loop?".to_string(),
            generation: "Repetition.".to_string(),
            model: "gpt-4".to_string(),
            tags: vec![],
            created_at: Utc::now(),
        };
        let first = sink.log_prompt(&record).await.unwrap();
        let second = sink.log_prompt(&record).await.unwrap();
        assert_ne!(first, second);

        let rating = FeedbackRecord::faces(
            first.clone(),
            "7",
            FeedbackQuestion::Answered,
            FaceRating::new(3).unwrap(),
            "gpt-4",
        );
        sink.log_feedback(&rating).await.unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["kind"], "prompt");
        assert_eq!(lines[0]["id"], first.0.as_str());
        assert_eq!(lines[0]["prompt"], "What is a loop?");
        assert_eq!(lines[2]["kind"], "feedback");
        assert_eq!(lines[2]["prompt_id"], first.0.as_str());
        assert_eq!(lines[2]["component"], "q1");
    }
}
