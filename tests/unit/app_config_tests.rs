/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use translore::app_config::{Config, LogLevel};

use crate::common;

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "zh");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.log_level, LogLevel::Info);

    assert_eq!(config.engines.deepl.timeout_secs, 30);
    assert!(config.engines.deepl.endpoint.is_empty());
    assert_eq!(config.engines.deepseek.endpoint, "https://api.deepseek.com/v1");
    assert_eq!(config.engines.deepseek.model, "deepseek-chat");
    assert_eq!(config.engines.deepseek.timeout_secs, 60);
    assert_eq!(config.engines.deepseek.temperature, 0.3);
    assert_eq!(config.engines.deepseek.max_tokens, 2000);

    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.retry_delay_ms, 1000);

    assert_eq!(config.knowledge.path.to_str(), Some("knowledge_base"));
    assert!(config.knowledge.use_enhanced_prompts);
    assert!(config.knowledge.use_rag);
    assert_eq!(config.knowledge.top_k, 5);
    assert_eq!(config.knowledge.min_confidence, 0.15);
    assert!(config.knowledge.auto_flush);
    assert!(!config.knowledge.learn);
    assert!(config.knowledge.scenes.is_none());

    assert_eq!(config.drift.similarity_threshold, 0.7);
    assert_eq!(config.chunking.max_chunk_chars, 1000);
    assert_eq!(config.chunking.overlap_chars, 100);
}

/// Test configuration validation
#[test]
fn test_validate_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    // Both API keys are required
    assert!(config.validate().is_err());
    config.engines.deepl.api_key = "key:fx".to_string();
    assert!(config.validate().is_err());
    config.engines.deepseek.api_key = "key".to_string();
    assert!(config.validate().is_ok());

    // Languages may be given by name
    config.source_language = "中文".to_string();
    config.target_language = "English".to_string();
    assert!(config.validate().is_ok());

    config.target_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.target_language = "en".to_string();

    config.knowledge.top_k = 0;
    assert!(config.validate().is_err());
    config.knowledge.top_k = 5;

    config.drift.similarity_threshold = 1.5;
    assert!(config.validate().is_err());
    config.drift.similarity_threshold = 0.7;

    // Chunks must make progress
    config.chunking.overlap_chars = 1000;
    assert!(config.validate().is_err());
    config.chunking.overlap_chars = 100;
    assert!(config.validate().is_ok());
}

/// Test that environment keys only fill empty configuration keys
#[test]
fn test_applyApiKeys_shouldOnlyFillEmptyKeys() {
    let mut config = Config::default();
    config.engines.deepl.api_key = "from-file".to_string();

    config.apply_api_keys(Some("from-env".to_string()), Some("deepseek-env".to_string()));
    assert_eq!(config.engines.deepl.api_key, "from-file");
    assert_eq!(config.engines.deepseek.api_key, "deepseek-env");

    let mut config = Config::default();
    config.apply_api_keys(Some("   ".to_string()), None);
    assert!(config.engines.deepl.api_key.is_empty());
    assert!(config.engines.deepseek.api_key.is_empty());
}

/// Test that a missing configuration file is created with defaults
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(created.source_language, "zh");

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded.knowledge.top_k, created.knowledge.top_k);
    assert_eq!(loaded.engines.deepseek.model, "deepseek-chat");
    Ok(())
}

/// Test that partial files fall back to per-field defaults
#[test]
fn test_deserialize_withPartialJson_shouldUseFieldDefaults() -> Result<()> {
    let json = r#"{
        "target_language": "ja",
        "engines": { "deepseek": { "api_key": "k", "temperature": 0.1 } },
        "knowledge": { "learn": true, "scenes": [ { "id": "games", "keywords": ["游戏"] } ] },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json)?;
    assert_eq!(config.source_language, "zh");
    assert_eq!(config.target_language, "ja");
    assert_eq!(config.engines.deepseek.temperature, 0.1);
    assert_eq!(config.engines.deepseek.max_tokens, 2000);
    assert!(config.knowledge.learn);
    assert!(config.knowledge.auto_flush);
    assert!(config.knowledge.use_enhanced_prompts);
    assert_eq!(config.log_level, LogLevel::Debug);

    let scenes = config.knowledge.scenes.unwrap();
    assert_eq!(scenes[0].id, "games");
    assert_eq!(scenes[0].weight, 1.0);
    Ok(())
}
