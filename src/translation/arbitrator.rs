/*!
 * Two-engine translation arbitration.
 *
 * Both engines translate independently. When only one succeeds its text is
 * used; when both succeed the translations are scored by an ordered chain of
 * `QualityScorer`s and a deterministic selection policy picks one:
 *
 * 1. a clear overall gap (> 0.2) picks the better score
 * 2. otherwise text features break the tie (mixed language and idioms favour
 *    the LLM engine, technical and formal texts the phrase engine)
 * 3. otherwise the higher overall wins, ties going to the phrase engine
 *
 * Nothing fails past this boundary; failures narrow the decision instead.
 */

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use super::features::{FeatureExtractor, TextFeatures};
use super::quality::{FeatureScorer, QualityScorer, ScorePair, ScoringRequest, score_with_chain};
use crate::providers::TranslationEngine;

/// Overall gap above which the better score wins outright
pub const DECISIVE_GAP: f32 = 0.2;
/// Confidence when only one engine produced a translation
pub const SINGLE_ENGINE_CONFIDENCE: f32 = 0.8;
/// Confidence of a feature-based tie-break
pub const FEATURE_TIE_BREAK_CONFIDENCE: f32 = 0.9;
/// Confidence of the length-based fallback
pub const FALLBACK_CONFIDENCE: f32 = 0.7;
/// Texts shorter than this (chars) go to the phrase engine in the fallback
pub const SHORT_TEXT_CHARS: usize = 50;
/// Method tag when neither engine produced a translation
pub const FAILED_METHOD: &str = "failed";
/// Overall scores closer than this count as a tie
const TIE_TOLERANCE: f32 = 1e-6;

/// Which engine produced a chosen translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineRole {
    Phrase,
    Llm,
}

/// Outcome of arbitrating one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArbitrationDecision {
    /// Chosen translation; empty when both engines failed
    pub text: String,
    /// Method tag such as `deepl_only` or `deepseek_cultural`
    pub method: String,
    /// Confidence in the choice (0.0 - 1.0)
    pub confidence: f32,
    /// Engine that produced `text`, absent when both failed
    pub chosen: Option<EngineRole>,
    /// Raw output of the phrase-based engine
    pub phrase_output: Option<String>,
    /// Raw output of the LLM engine
    pub llm_output: Option<String>,
    /// Scores used for the choice, when both engines succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScorePair>,
}

impl ArbitrationDecision {
    /// Whether a translation was produced at all.
    pub fn succeeded(&self) -> bool {
        self.chosen.is_some()
    }
}

/// Chooses between a phrase-based engine and an LLM engine.
#[derive(Debug)]
pub struct TranslationArbitrator {
    phrase_engine: Arc<dyn TranslationEngine>,
    llm_engine: Arc<dyn TranslationEngine>,
    scorers: Vec<Box<dyn QualityScorer>>,
    features: FeatureExtractor,
}

impl TranslationArbitrator {
    /// Create an arbitrator scoring with the feature table only.
    pub fn new(phrase_engine: Arc<dyn TranslationEngine>, llm_engine: Arc<dyn TranslationEngine>) -> Self {
        Self {
            phrase_engine,
            llm_engine,
            scorers: vec![Box::new(FeatureScorer)],
            features: FeatureExtractor::default(),
        }
    }

    /// Replace the scoring chain; scorers are tried in order.
    pub fn with_scorers(mut self, scorers: Vec<Box<dyn QualityScorer>>) -> Self {
        self.scorers = scorers;
        self
    }

    /// Replace the feature extractor.
    pub fn with_features(mut self, features: FeatureExtractor) -> Self {
        self.features = features;
        self
    }

    /// Name of the phrase-based engine.
    pub fn phrase_engine_name(&self) -> &str {
        self.phrase_engine.name()
    }

    /// Name of the LLM engine.
    pub fn llm_engine_name(&self) -> &str {
        self.llm_engine.name()
    }

    /// Translate with both engines and pick one result.
    pub async fn arbitrate(&self, text: &str, source_language: &str, target_language: &str) -> ArbitrationDecision {
        let (phrase_output, llm_output) = tokio::join!(
            self.phrase_engine.translate(text, source_language, target_language),
            self.llm_engine.translate(text, source_language, target_language),
        );
        let phrase_output = phrase_output.filter(|t| !t.trim().is_empty());
        let llm_output = llm_output.filter(|t| !t.trim().is_empty());

        let decision = match (phrase_output.as_deref(), llm_output.as_deref()) {
            (Some(phrase), None) => self.single(EngineRole::Phrase, phrase),
            (None, Some(llm)) => self.single(EngineRole::Llm, llm),
            (None, None) => {
                warn!("Both engines failed to translate the text");
                Selection {
                    role: None,
                    text: String::new(),
                    method: FAILED_METHOD.to_string(),
                    confidence: 0.0,
                    scores: None,
                }
            }
            (Some(phrase), Some(llm)) => self.select(text, source_language, target_language, phrase, llm).await,
        };

        info!(
            "Arbitration chose {} (confidence {:.2})",
            decision.method, decision.confidence
        );

        ArbitrationDecision {
            text: decision.text,
            method: decision.method,
            confidence: decision.confidence.clamp(0.0, 1.0),
            chosen: decision.role,
            phrase_output,
            llm_output,
            scores: decision.scores,
        }
    }

    /// Translate a decision's text back with the engine that did not produce it.
    pub async fn back_translate(
        &self,
        decision: &ArbitrationDecision,
        source_language: &str,
        target_language: &str,
    ) -> Option<String> {
        if decision.text.trim().is_empty() {
            return None;
        }

        let engine = if decision.method.starts_with(self.phrase_engine.name()) {
            &self.llm_engine
        } else {
            &self.phrase_engine
        };
        debug!("Back-translating with {}", engine.name());

        engine
            .translate(&decision.text, target_language, source_language)
            .await
            .filter(|t| !t.trim().is_empty())
    }

    fn single(&self, role: EngineRole, text: &str) -> Selection {
        Selection {
            role: Some(role),
            text: text.to_string(),
            method: format!("{}_only", self.engine_name(role)),
            confidence: SINGLE_ENGINE_CONFIDENCE,
            scores: None,
        }
    }

    async fn select(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        phrase: &str,
        llm: &str,
    ) -> Selection {
        let features = self.features.analyze(text);
        let request = ScoringRequest {
            text,
            source_language,
            target_language,
            phrase_engine: self.phrase_engine.name(),
            phrase_translation: phrase,
            llm_engine: self.llm_engine.name(),
            llm_translation: llm,
            features: &features,
        };

        let Some((scorer, scores)) = score_with_chain(&self.scorers, &request).await else {
            return self.fallback(&features, phrase, llm);
        };
        debug!("Scored with {}: gap {:.2}", scorer, scores.gap());

        let (role, tag, confidence) = select_by_policy(&scores, &features);
        let chosen = match role {
            EngineRole::Phrase => phrase,
            EngineRole::Llm => llm,
        };

        Selection {
            role: Some(role),
            text: chosen.to_string(),
            method: format!("{}_{}", self.engine_name(role), tag),
            confidence,
            scores: Some(scores),
        }
    }

    fn fallback(&self, features: &TextFeatures, phrase: &str, llm: &str) -> Selection {
        let (role, text) = if features.length < SHORT_TEXT_CHARS {
            (EngineRole::Phrase, phrase)
        } else {
            (EngineRole::Llm, llm)
        };

        Selection {
            role: Some(role),
            text: text.to_string(),
            method: format!("{}_fallback", self.engine_name(role)),
            confidence: FALLBACK_CONFIDENCE,
            scores: None,
        }
    }

    fn engine_name(&self, role: EngineRole) -> &str {
        match role {
            EngineRole::Phrase => self.phrase_engine.name(),
            EngineRole::Llm => self.llm_engine.name(),
        }
    }
}

/// Intermediate result before it becomes a decision
struct Selection {
    role: Option<EngineRole>,
    text: String,
    method: String,
    confidence: f32,
    scores: Option<ScorePair>,
}

/// Engine, method suffix and confidence chosen for a scored pair.
pub fn select_by_policy(scores: &ScorePair, features: &TextFeatures) -> (EngineRole, &'static str, f32) {
    let phrase = scores.phrase.overall();
    let llm = scores.llm.overall();

    if (phrase - llm).abs() > DECISIVE_GAP {
        return if phrase > llm {
            (EngineRole::Phrase, "selected", phrase)
        } else {
            (EngineRole::Llm, "selected", llm)
        };
    }

    if features.mixed_language.is_mixed {
        (EngineRole::Llm, "mixed_language", FEATURE_TIE_BREAK_CONFIDENCE)
    } else if features.cultural_elements {
        (EngineRole::Llm, "cultural", FEATURE_TIE_BREAK_CONFIDENCE)
    } else if features.technical_terms {
        (EngineRole::Phrase, "technical", FEATURE_TIE_BREAK_CONFIDENCE)
    } else if features.is_formal() {
        (EngineRole::Phrase, "formal", FEATURE_TIE_BREAK_CONFIDENCE)
    } else if phrase + TIE_TOLERANCE >= llm {
        (EngineRole::Phrase, "default", phrase)
    } else {
        (EngineRole::Llm, "default", llm)
    }
}
