/*!
 * Provider implementations for the translation engines.
 *
 * This module contains client implementations for the remote services:
 * - DeepL: phrase-based translation API
 * - DeepSeek: OpenAI-compatible chat completions API
 *
 * Clients implement the low-level `Provider` trait. On top of that, the
 * capability traits `TranslationEngine` and `TextCompletion` hide retries and
 * errors: a call either yields text or `None`, and failures are logged.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use url::Url;

use crate::errors::ProviderError;

/// Common trait for all remote providers
///
/// This trait defines the raw request/response interface of a service client.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a single request, without retries
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// A translation engine that never fails past its boundary.
#[async_trait]
pub trait TranslationEngine: Send + Sync + Debug {
    /// Short engine name used in decision method tags
    fn name(&self) -> &str;

    /// Translate `text`, returning `None` when the engine could not produce a result
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Option<String>;
}

/// A free-form text completion capability (used for rubric scoring and drift judging).
#[async_trait]
pub trait TextCompletion: Send + Sync + Debug {
    /// Complete a prompt, returning `None` when the call failed
    async fn complete_text(&self, prompt: &str) -> Option<String>;
}

/// Join an API path onto a configured base URL.
pub(crate) fn endpoint_url(base: &str, path: &str) -> Result<Url, ProviderError> {
    let base = format!("{}/", base.trim().trim_end_matches('/'));
    let base = Url::parse(&base)
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", base, e)))?;
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint path '{}': {}", path, e)))
}

pub mod deepl;
pub mod deepseek;
pub mod mock;
pub mod retry;
