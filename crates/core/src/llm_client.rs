use crate::{
    message::{Message, Role},
    services::CompletionService,
};
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use tracing::debug;

/// An implementation of `CompletionService` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The specific model identifier to use for chat completions (e.g., "gpt-4o").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

/// Converts the session transcript into chat request messages, preserving order.
pub fn to_request_messages(history: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>> {
    history
        .iter()
        .map(|msg| -> Result<ChatCompletionRequestMessage> {
            let message = match msg.role {
                Role::System => ChatCompletionRequestMessage::from(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(msg.content.clone())
                        .build()?,
                ),
                Role::Assistant => ChatCompletionRequestMessage::from(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(msg.content.clone())
                        .build()?,
                ),
                Role::User => ChatCompletionRequestMessage::from(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(msg.content.clone())
                        .build()?,
                ),
            };
            Ok(message)
        })
        .collect()
}

#[async_trait]
impl CompletionService for OpenAICompatibleClient {
    async fn complete(&self, history: &[Message]) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(to_request_messages(history)?)
            .build()?;

        debug!(model = %self.model, turns = history.len(), "Requesting completion");
        let response: CreateChatCompletionResponse = self.client.chat().create(request).await?;

        let answer = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .as_ref()
            .context("No content in LLM response")?;

        Ok(answer.trim().to_string())
    }
}
