/*!
 * Knowledge-enhanced translation prompt composition.
 *
 * The composer detects scenes, retrieves expression records and guidelines,
 * and lays them out in fixed sections ahead of the source text. Sections with
 * nothing to show are left out, so composition never fails.
 */

use std::fmt::Write as _;
use std::sync::Arc;

use log::debug;

use super::templates::{
    ANALYSIS_HEADING, ANALYSIS_REQUIREMENTS, GUIDELINES_HEADING, KNOWLEDGE_HEADING, MIXED_LANGUAGE_NOTICE,
    PRINCIPLES_HEADING, SCENE_HEADING, TRANSLATION_PRINCIPLES, basic_prompt, numbered_block,
    requirements_block, translation_header,
};
use crate::knowledge::retriever::DEFAULT_MIN_CONFIDENCE;
use crate::knowledge::{KnowledgeRetriever, RetrievalResult, SceneMatch};
use crate::language_utils::{prompt_language_name, resolve_language_code};
use crate::translation::mixed_language::{LanguageSegmenter, MixedLanguageSignal, ScriptSegmenter};

/// Number of detected scenes listed in the prompt
const MAX_LISTED_SCENES: usize = 3;
/// Number of guidelines listed in the prompt
const MAX_GUIDELINES: usize = 5;

/// Builds translation prompts from retrieved knowledge.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    retriever: Arc<KnowledgeRetriever>,
    segmenter: Arc<dyn LanguageSegmenter>,
    min_confidence: f32,
}

impl PromptComposer {
    /// Create a composer with the default script segmenter.
    pub fn new(retriever: Arc<KnowledgeRetriever>) -> Self {
        Self::with_segmenter(retriever, Arc::new(ScriptSegmenter))
    }

    /// Create a composer with a custom segmenter.
    pub fn with_segmenter(retriever: Arc<KnowledgeRetriever>, segmenter: Arc<dyn LanguageSegmenter>) -> Self {
        Self {
            retriever,
            segmenter,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Set the relevance floor for retrieved records.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// The retriever backing the knowledge sections.
    pub fn retriever(&self) -> &KnowledgeRetriever {
        &self.retriever
    }

    /// Build a prompt, detecting mixed-language content with the segmenter.
    pub fn build(&self, text: &str, source_language: &str, target_language: &str, use_rag: bool, top_k: usize) -> String {
        let signal = self.segmenter.segment(text);
        self.build_with_signal(text, source_language, target_language, use_rag, top_k, &signal)
    }

    /// Build a prompt with an explicit mixed-language signal.
    pub fn build_with_signal(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        use_rag: bool,
        top_k: usize,
        signal: &MixedLanguageSignal,
    ) -> String {
        let mut prompt = translation_header(
            &prompt_language_name(source_language),
            &prompt_language_name(target_language),
        );

        if !use_rag {
            prompt.push_str("原文：");
            prompt.push_str(text);
            return prompt;
        }

        let scenes = self.retriever.classifier().detect_scenes(text);
        let retrieved = self.retriever.retrieve(text, None, top_k, self.min_confidence);
        debug!(
            "Composing prompt with {} scene(s) and {} knowledge record(s)",
            scenes.len(),
            retrieved.len()
        );

        prompt.push_str(&self.scene_section(&scenes));
        prompt.push_str(&knowledge_section(&retrieved, target_language));
        prompt.push_str(&self.guideline_section(&scenes));
        if signal.is_mixed {
            prompt.push_str(MIXED_LANGUAGE_NOTICE);
        }
        prompt.push_str(&requirements_block());
        prompt.push_str("原文：");
        prompt.push_str(text);
        prompt
    }

    /// Enhanced prompt without retrieved knowledge, detecting mixed-language
    /// content with the segmenter.
    pub fn enhanced_prompt(&self, text: &str, source_language: &str, target_language: &str) -> String {
        let signal = self.segmenter.segment(text);
        self.enhanced_prompt_with_signal(text, source_language, target_language, &signal)
    }

    /// Enhanced prompt without retrieved knowledge: the mixed-language notice
    /// when needed, then the analysis and principles blocks.
    pub fn enhanced_prompt_with_signal(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        signal: &MixedLanguageSignal,
    ) -> String {
        let mut prompt = translation_header(
            &prompt_language_name(source_language),
            &prompt_language_name(target_language),
        );

        if signal.is_mixed {
            prompt.push_str(MIXED_LANGUAGE_NOTICE.trim_start());
        }
        prompt.push_str(&numbered_block(ANALYSIS_HEADING, &ANALYSIS_REQUIREMENTS));
        prompt.push_str(&numbered_block(PRINCIPLES_HEADING, &TRANSLATION_PRINCIPLES));
        prompt.push_str("原文：");
        prompt.push_str(text);
        prompt
    }

    /// Plain prompt used when enhancement is disabled.
    pub fn basic_prompt(&self, text: &str, source_language: &str, target_language: &str) -> String {
        basic_prompt(
            text,
            &prompt_language_name(source_language),
            &prompt_language_name(target_language),
        )
    }

    fn scene_section(&self, scenes: &[SceneMatch]) -> String {
        if scenes.is_empty() {
            return String::new();
        }

        let classifier = self.retriever.classifier();
        let listed: Vec<String> = scenes
            .iter()
            .take(MAX_LISTED_SCENES)
            .map(|s| format!("{} (置信度: {:.2})", classifier.display_name(&s.scene), s.confidence))
            .collect();

        format!("{}检测到以下场景：{}\n\n", SCENE_HEADING, listed.join(", "))
    }

    fn guideline_section(&self, scenes: &[SceneMatch]) -> String {
        if scenes.is_empty() {
            return String::new();
        }

        let scene_ids: Vec<String> = scenes.iter().map(|s| s.scene.clone()).collect();
        let guidelines = self.retriever.get_translation_guidelines(&scene_ids);
        if guidelines.is_empty() {
            return String::new();
        }

        let mut section = GUIDELINES_HEADING.to_string();
        for guideline in guidelines.iter().take(MAX_GUIDELINES) {
            let _ = writeln!(section, "- {}", guideline);
        }
        section.push('\n');
        section
    }
}

/// Knowledge section listing each retrieved record.
fn knowledge_section(retrieved: &[RetrievalResult], target_language: &str) -> String {
    if retrieved.is_empty() {
        return String::new();
    }

    let target_code = resolve_language_code(target_language);
    let mut section = KNOWLEDGE_HEADING.to_string();

    for (i, item) in retrieved.iter().enumerate() {
        let record = &item.expression;
        let _ = writeln!(section, "{}. 场景：{}（相关性：{:.2}）", i + 1, item.scene_name, item.relevance);
        let _ = writeln!(section, "   特殊表达：\"{}\"", record.source);

        if !record.variants.is_empty() {
            let _ = writeln!(section, "   变体：{}", record.variants.join(", "));
        }
        if let Some(meaning) = non_empty(&record.meaning) {
            let _ = writeln!(section, "   实际含义：{}", meaning);
        }
        if let Some(translation) = record.translation_for(target_code.as_deref()).filter(|t| !t.is_empty()) {
            let _ = writeln!(section, "   翻译建议：{}", translation);
        }
        if let Some(hint) = non_empty(&record.hint) {
            let _ = writeln!(section, "   翻译提示：{}", hint);
        }
        if let Some(context) = non_empty(&record.context) {
            let _ = writeln!(section, "   上下文：{}", context);
        }
        if let (Some(source), Some(target)) = (non_empty(&record.example_source), non_empty(&record.example_target)) {
            section.push_str("   示例：\n");
            let _ = writeln!(section, "     原文：{}", source);
            let _ = writeln!(section, "     译文：{}", target);
        }
        section.push('\n');
    }

    section
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}
