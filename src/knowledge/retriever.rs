/*!
 * Relevance-scored retrieval of knowledge records.
 *
 * Every record of the selected scenes is scored against the input text with a
 * deterministic heuristic (whole-word and substring hits of the expression and
 * its variants, a prefix similarity term and a small scene keyword bonus).
 * Records above the confidence floor are returned best first.
 */

use std::sync::Arc;

use log::debug;

use super::model::{ExpressionRecord, RetrievalResult};
use super::scenes::{MIN_SCENE_CONFIDENCE, SceneClassifier};
use super::similarity::{char_prefix, sequence_ratio};
use super::store::KnowledgeStore;

/// Default number of records returned
pub const DEFAULT_TOP_K: usize = 5;

/// Default relevance floor
pub const DEFAULT_MIN_CONFIDENCE: f32 = MIN_SCENE_CONFIDENCE;

const SOURCE_WORD_SCORE: f32 = 0.6;
const SOURCE_SUBSTRING_SCORE: f32 = 0.4;
const VARIANT_WORD_SCORE: f32 = 0.5;
const VARIANT_SUBSTRING_SCORE: f32 = 0.3;
const SIMILARITY_WEIGHT: f32 = 0.2;
const KEYWORD_SCORE: f32 = 0.05;
const KEYWORD_SCORE_CAP: f32 = 0.2;

/// Retrieves knowledge records relevant to a text.
#[derive(Debug, Clone)]
pub struct KnowledgeRetriever {
    store: Arc<KnowledgeStore>,
    classifier: Arc<SceneClassifier>,
}

impl KnowledgeRetriever {
    /// Create a retriever over a store and scene classifier.
    pub fn new(store: Arc<KnowledgeStore>, classifier: Arc<SceneClassifier>) -> Self {
        Self { store, classifier }
    }

    /// The scene classifier used when no scenes are given.
    pub fn classifier(&self) -> &SceneClassifier {
        &self.classifier
    }

    /// The backing store.
    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// Retrieve with the default `top_k` and confidence floor, detecting scenes.
    pub fn retrieve_default(&self, text: &str) -> Vec<RetrievalResult> {
        self.retrieve(text, None, DEFAULT_TOP_K, DEFAULT_MIN_CONFIDENCE)
    }

    /// Retrieve up to `top_k` records with relevance of at least `min_confidence`.
    ///
    /// When `scenes` is `None` the detected scenes reaching `min_confidence` are
    /// searched. Scenes without a loaded document are skipped. Results with equal
    /// relevance keep scene order, then record order.
    pub fn retrieve(
        &self,
        text: &str,
        scenes: Option<&[String]>,
        top_k: usize,
        min_confidence: f32,
    ) -> Vec<RetrievalResult> {
        let detected;
        let scenes = match scenes {
            Some(scenes) => scenes,
            None => {
                detected = self.classifier.detect_scene_ids(text, min_confidence);
                &detected
            }
        };
        if scenes.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let snapshot = self.store.snapshot();
        let mut results = Vec::new();

        for scene in scenes {
            let Some(kb) = snapshot.get(scene) else {
                debug!("No knowledge base loaded for scene {}", scene);
                continue;
            };
            let keyword_bonus = keyword_score(text, &kb.keywords);

            for record in &kb.expressions {
                let relevance = relevance(text, record, keyword_bonus);
                if relevance >= min_confidence {
                    results.push(RetrievalResult {
                        expression: record.clone(),
                        scene: scene.clone(),
                        scene_name: self.classifier.display_name(scene).to_string(),
                        relevance,
                    });
                }
            }
        }

        // sort_by is stable
        results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        results.truncate(top_k);
        results
    }

    /// Union of the guidelines of the given scenes, de-duplicated in first-seen order.
    pub fn get_translation_guidelines(&self, scenes: &[String]) -> Vec<String> {
        let snapshot = self.store.snapshot();
        let mut guidelines: Vec<String> = Vec::new();

        for kb in scenes.iter().filter_map(|scene| snapshot.get(scene)) {
            for guideline in &kb.guidelines {
                if !guidelines.contains(guideline) {
                    guidelines.push(guideline.clone());
                }
            }
        }

        guidelines
    }
}

/// Relevance of a record to a text (0.0 - 1.0).
///
/// Terms are summed before the final clamp, so a record with several matching
/// variants saturates at 1.0.
pub fn relevance(text: &str, record: &ExpressionRecord, keyword_bonus: f32) -> f32 {
    let mut score = 0.0;
    let source = record.source.as_str();

    if !source.is_empty() && text.contains(source) {
        score += if contains_word(text, source) {
            SOURCE_WORD_SCORE
        } else {
            SOURCE_SUBSTRING_SCORE
        };
    }

    for variant in record.variants.iter().filter(|v| !v.is_empty()) {
        if text.contains(variant.as_str()) {
            score += if contains_word(text, variant) {
                VARIANT_WORD_SCORE
            } else {
                VARIANT_SUBSTRING_SCORE
            };
        }
    }

    if !source.is_empty() {
        let window = char_prefix(text, source.chars().count() * 2);
        score += sequence_ratio(source, window) * SIMILARITY_WEIGHT;
    }

    score += keyword_bonus;
    score.clamp(0.0, 1.0)
}

/// Bonus for scene keywords occurring in the text.
pub fn keyword_score(text: &str, keywords: &[String]) -> f32 {
    let hits = keywords
        .iter()
        .filter(|k| !k.is_empty() && text.contains(k.as_str()))
        .count();
    (hits as f32 * KEYWORD_SCORE).min(KEYWORD_SCORE_CAP)
}

/// Whether `term` occurs in `text` delimited by Unicode word boundaries.
///
/// Same boundary rule as `\b` in `regex`: the characters on either side of the
/// boundary differ in being word characters, and the text edges count as
/// non-word.
fn contains_word(text: &str, term: &str) -> bool {
    let (Some(first), Some(last)) = (term.chars().next(), term.chars().next_back()) else {
        return false;
    };

    text.char_indices()
        .filter(|(start, _)| text[*start..].starts_with(term))
        .any(|(start, _)| {
            let end = start + term.len();
            let before = text[..start].chars().next_back().is_some_and(is_word_char);
            let after = text[end..].chars().next().is_some_and(is_word_char);
            before != is_word_char(first) && after != is_word_char(last)
        })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
