/*!
 * # translore - knowledge-enhanced translation with engine arbitration
 *
 * A Rust library that translates text with two engines, picks the better
 * result and checks it by back-translation.
 *
 * ## Features
 *
 * - Scene-tagged knowledge base of expressions and translation guidelines
 * - Knowledge-enhanced prompts for the LLM engine
 * - Two translation engines:
 *   - DeepL (phrase-based)
 *   - DeepSeek chat completions (LLM)
 * - Quality arbitration with a rubric scorer and a feature-based fallback
 * - Back-translation and semantic drift judging
 * - Learning new expressions from translated text
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `knowledge`: Knowledge store, scene classification, retrieval and learning
 * - `translation`: Prompts, quality scoring, arbitration and drift:
 *   - `translation::prompts`: Prompt templates and composition
 *   - `translation::quality`: Quality scores and scoring strategies
 *   - `translation::arbitrator`: Engine selection policy
 *   - `translation::drift`: Back-translation drift judging
 * - `app_controller`: Main application controller
 * - `language_utils`: Language name and ISO code utilities
 * - `providers`: Client implementations for the remote services:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::deepseek`: DeepSeek API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod knowledge;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{ChunkReport, Controller, SceneReport, TranslationReport};
pub use errors::{AppError, KnowledgeError, ProviderError};
pub use knowledge::{KnowledgeLearner, KnowledgeRetriever, KnowledgeStore, SceneCatalog, SceneClassifier};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use providers::{TextCompletion, TranslationEngine};
pub use translation::{ArbitrationDecision, DriftReport, PromptComposer, TranslationArbitrator};
