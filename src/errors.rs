/*!
 * Error types for the translore application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The account ran out of quota
    #[error("Quota exhausted: {0}")]
    QuotaExceeded(String),

    /// The provider cannot handle the requested language pair
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl ProviderError {
    /// Whether another attempt may succeed.
    ///
    /// Timeouts, connection failures, rate limits and server-side (5xx) errors are
    /// transient; everything else is terminal.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Whether the failure was a rate-limit response
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimitExceeded(_))
    }

    /// Map a transport error from reqwest onto the provider taxonomy
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while loading or persisting knowledge base documents
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// Reading or writing a scene document failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A scene document is not valid JSON for the expected shape
    #[error("Invalid knowledge base document {path}: {source}")]
    Parse {
        /// File involved
        path: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Serializing a document failed
    #[error("Failed to serialize knowledge base for scene {scene}: {source}")]
    Serialize {
        /// Scene identifier
        scene: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The atomic rename of a freshly written document failed
    #[error("Failed to replace {path}: {message}")]
    Persist {
        /// File involved
        path: String,
        /// Error description
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the knowledge store
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
