/*!
 * Tests for error types
 */

use std::io;
use translore::errors::{AppError, KnowledgeError, ProviderError};

/// Test which provider failures are worth retrying
#[test]
fn test_providerError_isRetriable_shouldClassifyTransientFailures() {
    assert!(ProviderError::Timeout("slow".to_string()).is_retriable());
    assert!(ProviderError::ConnectionError("reset".to_string()).is_retriable());
    assert!(ProviderError::RateLimitExceeded("429".to_string()).is_retriable());
    assert!(ProviderError::ApiError { status_code: 503, message: "busy".to_string() }.is_retriable());

    assert!(!ProviderError::ApiError { status_code: 400, message: "bad".to_string() }.is_retriable());
    assert!(!ProviderError::AuthenticationError("key".to_string()).is_retriable());
    assert!(!ProviderError::QuotaExceeded("456".to_string()).is_retriable());
    assert!(!ProviderError::ParseError("json".to_string()).is_retriable());
    assert!(!ProviderError::UnsupportedLanguage("my".to_string()).is_retriable());

    assert!(ProviderError::RateLimitExceeded("429".to_string()).is_rate_limit());
    assert!(!ProviderError::Timeout("slow".to_string()).is_rate_limit());
}

/// Test conversions into the application error
#[test]
fn test_appError_fromSourceErrors_shouldWrapThem() {
    let error: AppError = ProviderError::AuthenticationError("invalid key".to_string()).into();
    assert!(matches!(error, AppError::Provider(_)));
    assert_eq!(error.to_string(), "Provider error: Authentication error: invalid key");

    let error: AppError = KnowledgeError::Persist {
        path: "daily_life.json".to_string(),
        message: "rename failed".to_string(),
    }
    .into();
    assert!(matches!(error, AppError::Knowledge(_)));
    assert!(error.to_string().contains("daily_life.json"));

    let error: AppError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
    assert!(matches!(error, AppError::File(_)));

    let error: AppError = anyhow::anyhow!("something else").into();
    assert_eq!(error.to_string(), "Unknown error: something else");
}
