//! services/api/src/adapters/docs_llm.rs
//!
//! This module contains the adapter for the documentation-generating LLM.
//! It implements the `DocumentationService` port from the `core` crate against
//! any OpenAI-compatible chat-completions endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;
use async_trait::async_trait;
use code_docs_core::ports::{DocumentationService, PortError, PortResult};
use tracing::debug;

pub const SYSTEM_INSTRUCTION: &str = "Generate detailed markdown documentation including functions, parameters, returns, and examples.";

/// Prepended to the submitted code to form the user message.
pub const USER_PROMPT_PREFIX: &str = "Please document this code:\n\n";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiDocsAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiDocsAdapter {
    /// Creates a new `OpenAiDocsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client,
            model,
            max_tokens,
            temperature,
        }
    }

    /// Builds a client that gives up after the first failed attempt.
    ///
    /// async-openai retries 429 and 5xx responses with exponential backoff by
    /// default; a zero elapsed-time budget turns that off.
    pub fn client_without_retries(config: OpenAIConfig) -> Client<OpenAIConfig> {
        let no_retries = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        Client::with_config(config).with_backoff(no_retries)
    }

    fn build_messages(code: &str) -> PortResult<Vec<ChatCompletionRequestMessage>> {
        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTION)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("{}{}", USER_PROMPT_PREFIX, code))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ])
    }
}

/// Prefers the provider's own error message over the client's wrapper text.
fn provider_error(e: OpenAIError) -> PortError {
    match e {
        OpenAIError::ApiError(api_error) if !api_error.message.trim().is_empty() => {
            PortError::Provider(api_error.message)
        }
        other => PortError::Provider(other.to_string()),
    }
}

//=========================================================================================
// `DocumentationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentationService for OpenAiDocsAdapter {
    /// Sends one chat-completion request and returns the first choice's content.
    async fn generate_documentation(&self, code: &str) -> PortResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::build_messages(code)?)
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(provider_error)?;
        debug!("Provider answered with {} choice(s).", response.choices.len());

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(PortError::EmptyResponse)
    }
}
