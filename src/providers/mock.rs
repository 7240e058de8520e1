/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock engines that simulate different behaviors:
 * - `MockEngine::working()` - Always succeeds with a tagged translation
 * - `MockEngine::fixed()` - Always returns the same text
 * - `MockEngine::intermittent()` - Fails every Nth request
 * - `MockEngine::failing()` - Always fails with an error
 * - `MockEngine::slow()` - Succeeds after a delay
 *
 * `MockCompletion` replays scripted completions for rubric scoring and drift
 * judging, and records the prompts it was given.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{Provider, TextCompletion, TranslationEngine};

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
}

/// Behavior mode for the mock engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a tagged translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// Mock translation engine for testing arbitration behavior
#[derive(Debug)]
pub struct MockEngine {
    /// Engine name used in method tags
    name: String,
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Text returned instead of the generated translation (optional)
    fixed_text: Option<String>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockEngine {
    /// Create a new mock engine with the specified behavior
    pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            fixed_text: None,
            custom_response: None,
        }
    }

    /// Create a working mock engine that always succeeds
    pub fn working(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Working)
    }

    /// Create a mock engine that always returns `text`
    pub fn fixed(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut engine = Self::working(name);
        engine.fixed_text = Some(text.into());
        engine
    }

    /// Create an intermittently failing mock engine
    pub fn intermittent(name: impl Into<String>, fail_every: usize) -> Self {
        Self::new(name, MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock engine that always errors
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Failing)
    }

    /// Create a mock engine that succeeds after `delay_ms` milliseconds
    pub fn slow(name: impl Into<String>, delay_ms: u64) -> Self {
        Self::new(name, MockBehavior::Slow { delay_ms })
    }

    /// Create a mock that returns empty responses
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Empty)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn generate(&self, request: &MockRequest) -> String {
        if let Some(text) = &self.fixed_text {
            text.clone()
        } else if let Some(generator) = self.custom_response {
            generator(request)
        } else {
            format!("[{}:{}] {}", self.name, request.target_language, request.text)
        }
    }
}

impl Clone for MockEngine {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            fixed_text: self.fixed_text.clone(),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockEngine {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Ok(MockResponse {
                text: self.generate(&request),
            }),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(MockResponse {
                        text: self.generate(&request),
                    })
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(MockResponse { text: String::new() }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(MockResponse {
                    text: self.generate(&request),
                })
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };

        // Empty responses pass through so callers can check their own blank handling
        self.complete(request).await.ok().map(|r| Self::extract_text(&r))
    }
}

/// Scripted text completion for testing rubric scoring and drift judging
#[derive(Debug, Default)]
pub struct MockCompletion {
    /// Responses returned in order; `None` simulates a failed call
    script: Mutex<VecDeque<Option<String>>>,
    /// Response once the script is used up
    fallback: Option<String>,
    /// Prompts received so far
    prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    /// Replay `script` in order, then fail
    pub fn scripted(script: Vec<Option<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Always answer with `text`
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::default()
        }
    }

    /// Always fail
    pub fn failing() -> Self {
        Self::default()
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Number of completion calls so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl TextCompletion for MockCompletion {
    async fn complete_text(&self, prompt: &str) -> Option<String> {
        self.prompts.lock().push(prompt.to_string());
        match self.script.lock().pop_front() {
            Some(scripted) => scripted,
            None => self.fallback.clone(),
        }
    }
}
