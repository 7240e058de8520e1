/*!
 * Translation with two engines, quality arbitration and drift checking.
 *
 * This module is split into several submodules:
 *
 * - `chunking`: Splitting long texts into overlapping chunks
 * - `features`: Text features shared by scoring and selection
 * - `mixed_language`: Mixed-language detection
 * - `prompts`: Prompt templates and knowledge-enhanced composition
 * - `engines`: LLM-backed translation engine
 * - `quality`: Quality scores and the scoring chain
 * - `arbitrator`: Engine invocation and selection policy
 * - `drift`: Semantic drift of back-translations
 */

// Re-export main types for easier usage
pub use self::arbitrator::{ArbitrationDecision, EngineRole, TranslationArbitrator};
pub use self::chunking::{TextChunker, join_chunks};
pub use self::drift::{DriftJudge, DriftReport, SemanticVerdict};
pub use self::engines::{LlmTranslationEngine, PromptMode};
pub use self::features::{FeatureExtractor, FeatureMarkers, TextFeatures};
pub use self::mixed_language::{LanguageSegmenter, MixedLanguageSignal, ScriptSegmenter};

// Re-export prompt types
pub use self::prompts::{PromptComposer, PromptTemplate};

// Submodules
pub mod arbitrator;
pub mod chunking;
pub mod drift;
pub mod engines;
pub mod features;
pub mod mixed_language;
pub mod prompts;
pub mod quality;
