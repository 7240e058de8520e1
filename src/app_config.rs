use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::knowledge::SceneDefinition;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language (ISO code, English or Chinese name)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language (ISO code, English or Chinese name)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation engines
    #[serde(default)]
    pub engines: EnginesConfig,

    /// Retry behaviour shared by every provider call
    #[serde(default)]
    pub retry: RetryConfig,

    /// Knowledge base settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Back-translation drift judging
    #[serde(default)]
    pub drift: DriftConfig,

    /// Splitting of long texts
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Configuration of both translation engines
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EnginesConfig {
    /// Phrase-based engine (DeepL)
    #[serde(default)]
    pub deepl: DeepLConfig,

    /// LLM-based engine (DeepSeek chat completions)
    #[serde(default)]
    pub deepseek: DeepSeekConfig,
}

/// DeepL service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeepLConfig {
    /// API key; keys ending in `:fx` use the free endpoint
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL (empty selects free/pro by key)
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_deepl_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeepLConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_deepl_timeout_secs(),
        }
    }
}

/// DeepSeek service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeepSeekConfig {
    /// API key for bearer authentication
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_deepseek_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_deepseek_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_deepseek_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_deepseek_endpoint(),
            model: default_deepseek_model(),
            timeout_secs: default_deepseek_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Retry settings applied by every provider adapter
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total number of attempts per call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds (linear for transient errors, doubled for rate limits)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Knowledge base settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KnowledgeConfig {
    /// Directory holding one `<scene>.json` document per scene
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,

    /// Whether LLM prompts carry analysis guidance instead of the plain request
    #[serde(default = "default_true")]
    pub use_enhanced_prompts: bool,

    /// Whether to enrich enhanced LLM prompts with retrieved knowledge
    #[serde(default = "default_true")]
    pub use_rag: bool,

    /// Number of expressions retrieved per prompt
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum scene/relevance confidence
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// Write learned expressions to disk immediately
    #[serde(default = "default_true")]
    pub auto_flush: bool,

    /// Learn new expressions from every translation
    #[serde(default)]
    pub learn: bool,

    /// Replacement scene catalog; the built-in catalog is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<SceneDefinition>>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            use_enhanced_prompts: true,
            use_rag: true,
            top_k: default_top_k(),
            min_confidence: default_min_confidence(),
            auto_flush: true,
            learn: false,
            scenes: None,
        }
    }
}

/// Back-translation drift judging settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DriftConfig {
    /// Similarity below which a back-translation counts as drifted
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// Long text splitting settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Texts longer than this many characters are translated chunk by chunk
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Characters shared by consecutive chunks
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            overlap_chars: default_overlap_chars(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "zh".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_deepl_timeout_secs() -> u64 {
    30
}

fn default_deepseek_timeout_secs() -> u64 {
    60
}

fn default_deepseek_endpoint() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000 // 1 second base delay
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("knowledge_base")
}

fn default_top_k() -> usize {
    5
}

fn default_min_confidence() -> f32 {
    0.15
}

fn default_similarity_threshold() -> f32 {
    0.7
}

fn default_max_chunk_chars() -> usize {
    1000
}

fn default_overlap_chars() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration from a JSON file, writing a default one if the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Fill empty API keys from the given environment-style values
    pub fn apply_api_keys(&mut self, deepl_key: Option<String>, deepseek_key: Option<String>) {
        if let Some(key) = deepl_key.filter(|k| !k.trim().is_empty()) {
            if self.engines.deepl.api_key.is_empty() {
                self.engines.deepl.api_key = key;
            }
        }
        if let Some(key) = deepseek_key.filter(|k| !k.trim().is_empty()) {
            if self.engines.deepseek.api_key.is_empty() {
                self.engines.deepseek.api_key = key;
            }
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.source_language)
            .with_context(|| format!("Invalid source language: {}", self.source_language))?;
        crate::language_utils::get_language_name(&self.target_language)
            .with_context(|| format!("Invalid target language: {}", self.target_language))?;

        if self.engines.deepl.api_key.trim().is_empty() {
            return Err(anyhow!("DeepL API key is required"));
        }
        if self.engines.deepseek.api_key.trim().is_empty() {
            return Err(anyhow!("DeepSeek API key is required"));
        }

        if self.knowledge.top_k == 0 {
            return Err(anyhow!("knowledge.top_k must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.knowledge.min_confidence) {
            return Err(anyhow!("knowledge.min_confidence must be within 0.0..=1.0"));
        }
        if !(0.0..=1.0).contains(&self.drift.similarity_threshold) {
            return Err(anyhow!("drift.similarity_threshold must be within 0.0..=1.0"));
        }
        if self.chunking.max_chunk_chars == 0 {
            return Err(anyhow!("chunking.max_chunk_chars must be at least 1"));
        }
        if self.chunking.overlap_chars >= self.chunking.max_chunk_chars {
            return Err(anyhow!("chunking.overlap_chars must be smaller than chunking.max_chunk_chars"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            engines: EnginesConfig::default(),
            retry: RetryConfig::default(),
            knowledge: KnowledgeConfig::default(),
            drift: DriftConfig::default(),
            chunking: ChunkingConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
