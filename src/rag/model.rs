//! Chat completion models.

use super::memory::Role;
use super::prompt::AssembledPrompt;
use crate::config::RagSettings;
use crate::error::{CodeeError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// A model that turns an assembled prompt into an answer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &AssembledPrompt) -> Result<String>;

    /// Model identifier, recorded with logged turns.
    fn model_name(&self) -> &str;
}

/// Chat completions through the OpenAI API.
pub struct OpenAIChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a model for the caller-supplied API key.
    pub fn new(api_key: &str, settings: &RagSettings) -> Result<Self> {
        Ok(Self::with_client(
            create_client(api_key)?,
            &settings.model,
            settings.temperature,
        ))
    }

    pub fn with_client(client: Client<OpenAIConfig>, model: &str, temperature: f32) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature,
        }
    }

    fn to_messages(prompt: &AssembledPrompt) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(prompt.message_count());

        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.system.clone())
                .build()
                .map_err(|e| CodeeError::Rag(e.to_string()))?
                .into(),
        );

        for turn in &prompt.history {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| CodeeError::Rag(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| CodeeError::Rag(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        if let Some(question) = &prompt.question {
            messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(question.clone())
                    .build()
                    .map_err(|e| CodeeError::Rag(e.to_string()))?
                    .into(),
            );
        }

        Ok(messages)
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, prompt), fields(model = %self.model, messages = prompt.message_count()))]
    async fn complete(&self, prompt: &AssembledPrompt) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::to_messages(prompt)?)
            .temperature(self.temperature)
            .build()
            .map_err(|e| CodeeError::Rag(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            CodeeError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| CodeeError::Rag("Empty response from LLM".to_string()))?
            .clone();

        debug!("Model returned {} chars", answer.len());
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::memory::ChatTurn;

    #[test]
    fn test_to_messages_keeps_prompt_order() {
        let prompt = AssembledPrompt {
            system: "system".to_string(),
            history: vec![ChatTurn::user("q1"), ChatTurn::assistant("a1")],
            question: Some("q2".to_string()),
        };

        let messages = OpenAIChatModel::to_messages(&prompt).unwrap();
        assert_eq!(messages.len(), 4);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(messages[3], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_new_requires_credential() {
        let settings = RagSettings::default();
        assert!(matches!(
            OpenAIChatModel::new("", &settings),
            Err(CodeeError::MissingCredential)
        ));

        let model = OpenAIChatModel::new("sk-test", &settings).unwrap();
        assert_eq!(model.model_name(), "gpt-4");
    }
}
