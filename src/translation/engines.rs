/*!
 * LLM-backed translation engine.
 *
 * Wraps a text completion capability as a `TranslationEngine`: the source text
 * is turned into a prompt according to the engine's `PromptMode` and the
 * completion is the translation.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::providers::{TextCompletion, TranslationEngine};
use crate::translation::prompts::PromptComposer;

/// Engine name of the DeepSeek-backed translator
pub const DEEPSEEK_ENGINE_NAME: &str = "deepseek";

/// How the LLM prompt is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Knowledge-enhanced prompt with retrieved records and guidelines
    Rag,
    /// Analysis and principles blocks without retrieval
    Enhanced,
    /// Plain "translate and only return the translation" request
    Basic,
}

impl PromptMode {
    /// Mode for the `use_enhanced_prompts` and `use_rag` switches.
    ///
    /// Retrieval only applies to enhanced prompts.
    pub fn from_flags(use_enhanced_prompts: bool, use_rag: bool) -> Self {
        match (use_enhanced_prompts, use_rag) {
            (false, _) => PromptMode::Basic,
            (true, true) => PromptMode::Rag,
            (true, false) => PromptMode::Enhanced,
        }
    }

    /// Build the prompt for `text` in this mode.
    pub fn compose(
        self,
        composer: &PromptComposer,
        text: &str,
        source_language: &str,
        target_language: &str,
        top_k: usize,
    ) -> String {
        match self {
            PromptMode::Rag => composer.build(text, source_language, target_language, true, top_k),
            PromptMode::Enhanced => composer.enhanced_prompt(text, source_language, target_language),
            PromptMode::Basic => composer.basic_prompt(text, source_language, target_language),
        }
    }
}

/// Translation engine that prompts an LLM.
#[derive(Debug, Clone)]
pub struct LlmTranslationEngine {
    name: String,
    completion: Arc<dyn TextCompletion>,
    composer: PromptComposer,
    mode: PromptMode,
    top_k: usize,
}

impl LlmTranslationEngine {
    /// Create an engine named `name` over a completion capability.
    pub fn new(
        name: impl Into<String>,
        completion: Arc<dyn TextCompletion>,
        composer: PromptComposer,
        mode: PromptMode,
        top_k: usize,
    ) -> Self {
        Self {
            name: name.into(),
            completion,
            composer,
            mode,
            top_k,
        }
    }

    /// How prompts are built.
    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    /// Prompt that would be sent for `text`.
    pub fn prompt_for(&self, text: &str, source_language: &str, target_language: &str) -> String {
        self.mode
            .compose(&self.composer, text, source_language, target_language, self.top_k)
    }
}

#[async_trait]
impl TranslationEngine for LlmTranslationEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        let prompt = self.prompt_for(text, source_language, target_language);
        debug!("{} translating with a {}-char prompt", self.name, prompt.chars().count());

        self.completion
            .complete_text(&prompt)
            .await
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
