/*!
 * DeepL API client.
 *
 * Sends form-encoded requests to the `/v2/translate` endpoint. Keys ending in
 * `:fx` use the free endpoint. Language names and ISO codes are mapped to
 * DeepL codes, and languages DeepL does not offer fail before any request.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::retry::{FailureRecord, RetryPolicy, with_retry};
use super::{Provider, TranslationEngine, endpoint_url};
use crate::app_config::DeepLConfig;
use crate::errors::ProviderError;
use crate::language_utils::resolve_language_code;

/// Engine name used in decision method tags
pub const DEEPL_ENGINE_NAME: &str = "deepl";

const FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2";
const PRO_ENDPOINT: &str = "https://api.deepl.com/v2";
const FREE_KEY_SUFFIX: &str = ":fx";

/// DeepL status code for an exhausted character quota
const QUOTA_EXCEEDED_STATUS: u16 = 456;

/// DeepL client for the `/v2/translate` API
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL including the `/v2` prefix
    endpoint: String,
    /// Retry behaviour of engine calls
    retry: RetryPolicy,
    /// Last failure of an engine call
    failures: FailureRecord,
}

/// DeepL translate request
#[derive(Debug, Clone, PartialEq)]
pub struct DeepLRequest {
    /// Text to translate
    pub text: String,
    /// DeepL target language code (e.g. `EN`)
    pub target_lang: String,
    /// DeepL source language code; auto-detected when absent
    pub source_lang: Option<String>,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    /// Translations, one per submitted text
    #[serde(default)]
    pub translations: Vec<DeepLTranslation>,
}

/// A single translation in a DeepL response
#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    /// Language DeepL detected in the source
    #[serde(default)]
    pub detected_source_language: Option<String>,
    /// Translated text
    pub text: String,
}

impl DeepL {
    /// Create a client; the endpoint is chosen from the key when not configured.
    pub fn new(config: &DeepLConfig, retry: RetryPolicy) -> Self {
        let endpoint = if !config.endpoint.trim().is_empty() {
            config.endpoint.trim().to_string()
        } else {
            default_endpoint(&config.api_key).to_string()
        };

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint,
            retry,
            failures: FailureRecord::default(),
        }
    }

    /// Base URL in use.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Last failure of an engine call, if it failed.
    pub fn last_failure(&self) -> Option<ProviderError> {
        self.failures.last()
    }

    /// Build a request from language names or codes.
    pub fn build_request(
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<DeepLRequest, ProviderError> {
        let target_lang = deepl_language_code(target_language)
            .ok_or_else(|| ProviderError::UnsupportedLanguage(target_language.to_string()))?;
        let source_lang = if source_language.trim().eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(
                deepl_language_code(source_language)
                    .ok_or_else(|| ProviderError::UnsupportedLanguage(source_language.to_string()))?,
            )
        };

        Ok(DeepLRequest {
            text: text.to_string(),
            target_lang: target_lang.to_string(),
            source_lang: source_lang.map(str::to_string),
        })
    }
}

#[async_trait]
impl Provider for DeepL {
    type Request = DeepLRequest;
    type Response = DeepLResponse;

    async fn complete(&self, request: DeepLRequest) -> Result<DeepLResponse, ProviderError> {
        let url = endpoint_url(&self.endpoint, "translate")?;

        let mut form = vec![
            ("auth_key", self.api_key.as_str()),
            ("text", request.text.as_str()),
            ("target_lang", request.target_lang.as_str()),
        ];
        if let Some(source_lang) = request.source_lang.as_deref() {
            form.push(("source_lang", source_lang));
        }

        let response = self
            .client
            .post(url)
            .form(&form)
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
            .json::<DeepLResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepL response: {}", e)))?;

        if body.translations.is_empty() {
            return Err(ProviderError::ParseError("DeepL response contains no translations".to_string()));
        }
        Ok(body)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = Self::build_request("Hello", "auto", "zh")?;
        self.complete(request).await.map(|_| ())
    }

    fn extract_text(response: &DeepLResponse) -> String {
        response
            .translations
            .first()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TranslationEngine for DeepL {
    fn name(&self) -> &str {
        DEEPL_ENGINE_NAME
    }

    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        let request = match Self::build_request(text, source_language, target_language) {
            Ok(request) => request,
            Err(e) => {
                error!("DeepL cannot translate {} -> {}: {}", source_language, target_language, e);
                self.failures.set(Some(e));
                return None;
            }
        };

        debug!("DeepL translating {} chars to {}", text.chars().count(), request.target_lang);
        let response = with_retry(&self.retry, "DeepL translation", &self.failures, || {
            self.complete(request.clone())
        })
        .await?;

        Some(Self::extract_text(&response)).filter(|t| !t.trim().is_empty())
    }
}

/// Free or pro endpoint, chosen by the key suffix.
pub fn default_endpoint(api_key: &str) -> &'static str {
    if api_key.trim().ends_with(FREE_KEY_SUFFIX) {
        FREE_ENDPOINT
    } else {
        PRO_ENDPOINT
    }
}

/// DeepL language code for a language given as name or ISO code.
///
/// Burmese, Lao and Khmer are recognised but not offered by DeepL.
pub fn deepl_language_code(language: &str) -> Option<&'static str> {
    let code = resolve_language_code(language)?;
    let deepl = match code.as_str() {
        "zh" => "ZH",
        "en" => "EN",
        "vi" => "VI",
        "th" => "TH",
        "id" => "ID",
        "ms" => "MS",
        "tl" => "TL",
        "de" => "DE",
        "fr" => "FR",
        "es" => "ES",
        "it" => "IT",
        "ja" => "JA",
        "ko" => "KO",
        "pt" => "PT",
        "ru" => "RU",
        "nl" => "NL",
        "pl" => "PL",
        _ => return None,
    };
    Some(deepl)
}

/// Map a DeepL error status onto the provider taxonomy.
fn map_status(status: StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        429 => ProviderError::RateLimitExceeded(message),
        403 => ProviderError::AuthenticationError(message),
        QUOTA_EXCEEDED_STATUS => ProviderError::QuotaExceeded(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    }
}
