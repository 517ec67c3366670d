//! Integration with the OpenAI chat completions API.
//!
//! This module provides a thin wrapper around `async-openai` that turns a list of
//! role-tagged turns into a chat completion request, and maps provider failures
//! into [`CompletionError`] values with as much status detail as is available.

use std::{sync::Arc, time::Duration};

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    types::{ChatTurn, CompletionError, FailureReason, ModelConfig, TurnRole},
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let mut cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        if let Some(org_id) = &config.openai_organization_id {
            cfg = cfg.with_org_id(org_id.clone());
        }

        Self {
            client: Client::with_config(cfg),
            timeout: Duration::from_secs(config.openai_timeout_secs),
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::complete", skip_all, fields(model = %model.model))]
    async fn complete(&self, model: &ModelConfig, turns: &[ChatTurn]) -> Result<String, CompletionError> {
        let request = build_chat_request(model, turns).map_err(map_openai_error)?;

        debug!("Sending chat completion with {} turns", turns.len());

        let response = match timeout(self.timeout, self.client.chat().create(request)).await {
            Ok(result) => result.map_err(map_openai_error)?,
            Err(_) => {
                return Err(CompletionError::new(
                    FailureReason::Network,
                    format!("OpenAI API call timed out after {} seconds", self.timeout.as_secs()),
                ));
            }
        };

        info!("OpenAI API call returned {} choices.", response.choices.len());

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| CompletionError::new(FailureReason::Unknown, "OpenAI response contained no choices"))
    }
}

/// Build the chat completion request from the model parameters and turns.
pub fn build_chat_request(model: &ModelConfig, turns: &[ChatTurn]) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let messages = turns
        .iter()
        .map(|turn| match turn.role {
            TurnRole::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(turn.content.clone()),
                name: None,
            }),
            TurnRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(turn.content.clone()),
                name: None,
            }),
        })
        .collect::<Vec<_>>();

    let mut request = CreateChatCompletionRequestArgs::default();

    request.model(&model.model).messages(messages).temperature(model.temperature);

    if let Some(max_tokens) = model.max_tokens {
        request.max_completion_tokens(max_tokens);
    }

    request.build()
}

/// Map an `async-openai` error into a [`CompletionError`].
fn map_openai_error(err: OpenAIError) -> CompletionError {
    match err {
        OpenAIError::Reqwest(err) => {
            let status = err.status();

            CompletionError {
                reason: status.map(|s| FailureReason::from_status(s.as_u16())).unwrap_or(FailureReason::Network),
                status_code: status.map(|s| s.as_u16()),
                status_text: status.and_then(|s| s.canonical_reason()).map(str::to_string),
                message: Some(err.to_string()),
            }
        }
        OpenAIError::ApiError(api_error) => CompletionError {
            reason: classify_api_error(api_error.r#type.as_deref(), &api_error.message),
            status_code: None,
            status_text: api_error.r#type.clone(),
            message: Some(api_error.message),
        },
        other => CompletionError::new(FailureReason::Unknown, other.to_string()),
    }
}

/// Classify an API error body by its `type` field, falling back to the message text.
fn classify_api_error(error_type: Option<&str>, message: &str) -> FailureReason {
    match error_type {
        Some("insufficient_quota" | "requests" | "tokens" | "rate_limit_exceeded") => FailureReason::RateLimit,
        Some("authentication_error" | "permission_error") => FailureReason::Auth,
        _ if message.contains("API key") => FailureReason::Auth,
        _ if message.contains("Rate limit") => FailureReason::RateLimit,
        _ => FailureReason::Unknown,
    }
}

// Tests.
