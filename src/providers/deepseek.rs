/*!
 * DeepSeek API client.
 *
 * Talks to the OpenAI-compatible chat completions endpoint with bearer
 * authentication. Serves as the text completion behind the LLM translation
 * engine, the rubric scorer and the drift judge.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};

use super::retry::{FailureRecord, RetryPolicy, with_retry};
use super::{Provider, TextCompletion, endpoint_url};
use crate::app_config::DeepSeekConfig;
use crate::errors::ProviderError;

/// DeepSeek client for the OpenAI-compatible chat completions API
#[derive(Debug)]
pub struct DeepSeek {
    /// HTTP client for API requests
    client: Client,
    /// API key for bearer authentication
    api_key: String,
    /// Base URL (e.g. `https://api.deepseek.com/v1`)
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Completion token budget
    max_tokens: u32,
    /// Retry behaviour of completion calls
    retry: RetryPolicy,
    /// Last failure of a completion call
    failures: FailureRecord,
}

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The model to use
    pub model: String,

    /// The messages for the conversation
    pub messages: Vec<ChatMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (user, assistant, system)
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Completion choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
}

impl ChatRequest {
    /// Create a request with a single user message
    pub fn user(model: impl Into<String>, content: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: content.into(),
            }],
            temperature: None,
            max_tokens,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl DeepSeek {
    /// Create a client from configuration.
    pub fn new(config: &DeepSeekConfig, retry: RetryPolicy) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry,
            failures: FailureRecord::default(),
        }
    }

    /// Last failure of a completion call, if it failed.
    pub fn last_failure(&self) -> Option<ProviderError> {
        self.failures.last()
    }

    /// Request for a single prompt with the configured sampling settings.
    pub fn prompt_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest::user(&self.model, prompt, self.max_tokens).temperature(self.temperature)
    }
}

#[async_trait]
impl Provider for DeepSeek {
    type Request = ChatRequest;
    type Response = ChatResponse;

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = endpoint_url(&self.endpoint, "chat/completions")?;

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(map_status(status, message));
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepSeek response: {}", e)))?;

        if body.choices.is_empty() {
            return Err(ProviderError::ParseError("DeepSeek response contains no choices".to_string()));
        }
        Ok(body)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = ChatRequest::user(&self.model, "Hello", 10);
        self.complete(request).await.map(|_| ())
    }

    fn extract_text(response: &ChatResponse) -> String {
        response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextCompletion for DeepSeek {
    async fn complete_text(&self, prompt: &str) -> Option<String> {
        let request = self.prompt_request(prompt);
        debug!("DeepSeek completion with {} prompt chars", prompt.chars().count());

        let response = with_retry(&self.retry, "DeepSeek completion", &self.failures, || {
            self.complete(request.clone())
        })
        .await?;

        Some(Self::extract_text(&response)).filter(|t| !t.is_empty())
    }
}

/// Map a DeepSeek error status onto the provider taxonomy.
fn map_status(status: StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        402 => ProviderError::QuotaExceeded(message),
        429 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    }
}
