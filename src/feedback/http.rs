//! HTTP feedback service client.

use super::{FeedbackRecord, FeedbackSink, PromptId, PromptRecord};
use crate::error::{CodeeError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct LoggedPrompt {
    id: String,
}

/// Posts records as JSON to `<endpoint>/projects/<project>/{prompts,feedback}`.
pub struct HttpFeedbackSink {
    client: reqwest::Client,
    base: Url,
    project: String,
    token: Option<String>,
}

impl HttpFeedbackSink {
    pub fn new(endpoint: &str, project: &str, token: Option<String>) -> Result<Self> {
        let base = Url::parse(endpoint).map_err(|e| {
            CodeeError::Config(format!("Invalid feedback endpoint '{}': {}", endpoint, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(CodeeError::Config(format!(
                "Invalid feedback endpoint '{}': not a base URL",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base,
            project: project.to_string(),
            token,
        })
    }

    fn url(&self, collection: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CodeeError::Config("Feedback endpoint is not a base URL".to_string()))?
            .pop_if_empty()
            .extend(["projects", self.project.as_str(), collection]);
        Ok(url)
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.post(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl FeedbackSink for HttpFeedbackSink {
    #[instrument(skip_all, fields(session = %record.session_id))]
    async fn log_prompt(&self, record: &PromptRecord) -> Result<PromptId> {
        let response = self
            .post(self.url("prompts")?)
            .json(record)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| CodeeError::Feedback(format!("Failed to log prompt: {}", e)))?;

        let logged: LoggedPrompt = response.json().await?;
        debug!("Logged prompt {}", logged.id);
        Ok(PromptId(logged.id))
    }

    #[instrument(skip_all, fields(prompt_id = %record.prompt_id, component = %record.component))]
    async fn log_feedback(&self, record: &FeedbackRecord) -> Result<()> {
        self.post(self.url("feedback")?)
            .json(record)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| CodeeError::Feedback(format!("Failed to log feedback: {}", e)))?;

        debug!("Logged feedback");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FaceRating, FeedbackQuestion};
    use chrono::Utc;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt_record() -> PromptRecord {
        PromptRecord {
            session_id: Uuid::new_v4(),
            user_id: "17".to_string(),
            prompt: "What is a variable?".to_string(),
            generation: "A named value.".to_string(),
            model: "gpt-4".to_string(),
            tags: vec!["codee_chat".to_string()],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_log_prompt_returns_service_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects/codee_a/prompts"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "user_id": "17",
                "model": "gpt-4",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "prompt-abc" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpFeedbackSink::new(
            &format!("{}/api", server.uri()),
            "codee_a",
            Some("secret".to_string()),
        )
        .unwrap();

        let id = sink.log_prompt(&prompt_record()).await.unwrap();
        assert_eq!(id, PromptId("prompt-abc".to_string()));
    }

    #[tokio::test]
    async fn test_log_feedback_posts_rating() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/codee_a/feedback"))
            .and(body_partial_json(serde_json::json!({
                "prompt_id": "prompt-abc",
                "component": "q2",
                "feedback_type": "faces",
                "score": 5,
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpFeedbackSink::new(&server.uri(), "codee_a", None).unwrap();
        let record = FeedbackRecord::faces(
            PromptId("prompt-abc".to_string()),
            "17",
            FeedbackQuestion::Personalized,
            FaceRating::new(5).unwrap(),
            "gpt-4",
        );

        sink.log_feedback(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_service_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = HttpFeedbackSink::new(&server.uri(), "codee_a", None).unwrap();
        let err = sink.log_prompt(&prompt_record()).await.unwrap_err();
        assert!(matches!(err, CodeeError::Feedback(_)));
    }

    #[test]
    fn test_rejects_non_base_endpoint() {
        assert!(HttpFeedbackSink::new("mailto:someone@example.com", "codee_a", None).is_err());
        assert!(HttpFeedbackSink::new("::", "codee_a", None).is_err());
    }
}
