/*!
 * Semantic drift between an original text and its back-translation.
 *
 * The LLM rates the semantic similarity of both texts. When the call fails
 * the judge falls back to character-set overlap. The consistency threshold is
 * relaxed when the LLM calls the texts identical or similar, and for very
 * short texts.
 */

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::language_utils::prompt_language_name;
use crate::providers::TextCompletion;
use crate::translation::prompts::PromptTemplate;

/// Default similarity threshold for consistency
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;
/// Threshold when the judge calls both texts identical
const IDENTICAL_THRESHOLD: f32 = 0.5;
/// Threshold when the judge calls both texts similar, or either is very short
const RELAXED_THRESHOLD: f32 = 0.6;
/// Texts up to this many characters count as very short
const SHORT_TEXT_CHARS: usize = 3;
/// Judge confidence of the overlap fallback
const FALLBACK_CONFIDENCE: f32 = 0.3;

static SIMILARITY_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"相似度分数:\s*([0-9.]+)").expect("valid similarity pattern"));
static SEMANTIC_VERDICT: Lazy<Regex> = Lazy::new(|| Regex::new(r"语义含义:\s*(\w+)").expect("valid verdict pattern"));
static JUDGE_CONFIDENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"置信度:\s*([0-9.]+)").expect("valid confidence pattern"));

/// The judge's verdict on whether two texts mean the same
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticVerdict {
    Identical,
    Similar,
    Different,
    Unknown,
}

impl SemanticVerdict {
    /// Parse a verdict word; anything unrecognised is `Unknown`.
    pub fn parse(word: &str) -> Self {
        match word.trim().to_ascii_lowercase().as_str() {
            "identical" => SemanticVerdict::Identical,
            "similar" => SemanticVerdict::Similar,
            "different" => SemanticVerdict::Different,
            _ => SemanticVerdict::Unknown,
        }
    }
}

/// Result of judging one back-translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    /// Semantic similarity (0.0 - 1.0)
    pub similarity: f32,
    /// Whether the similarity reaches the threshold
    pub is_consistent: bool,
    /// Threshold used
    pub threshold: f32,
    /// Consistency level label
    pub level: &'static str,
    /// Semantic verdict
    pub verdict: SemanticVerdict,
    /// Judge confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Judge analysis or a note on how the score was obtained
    pub analysis: String,
    /// Whether both texts are exactly equal
    pub is_identical: bool,
}

impl DriftReport {
    /// Short recommendation for the user.
    pub fn suggestion(&self) -> &'static str {
        if self.is_identical {
            "文本完全相同，翻译质量优秀"
        } else if self.verdict == SemanticVerdict::Identical {
            "语义完全相同，翻译质量优秀"
        } else if self.verdict == SemanticVerdict::Similar {
            "语义相似，翻译质量良好"
        } else if self.is_consistent {
            "翻译质量良好，语义保持一致"
        } else {
            "翻译可能存在语义偏差，建议检查翻译质量"
        }
    }
}

/// Label for a similarity score.
pub fn consistency_level(similarity: f32) -> &'static str {
    if similarity >= 0.95 {
        "几乎完全一致"
    } else if similarity >= 0.9 {
        "高度一致"
    } else if similarity >= 0.8 {
        "基本一致"
    } else if similarity >= 0.7 {
        "部分一致"
    } else if similarity >= 0.5 {
        "低度一致"
    } else {
        "不一致"
    }
}

/// Jaccard overlap of the lower-cased character sets of two texts.
pub fn char_overlap(a: &str, b: &str) -> f32 {
    let a: HashSet<char> = a.to_lowercase().chars().collect();
    let b: HashSet<char> = b.to_lowercase().chars().collect();

    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let intersection = a.intersection(&b).count();
            let union = a.union(&b).count();
            intersection as f32 / union as f32
        }
    }
}

/// Judges semantic drift with an LLM.
#[derive(Debug, Clone)]
pub struct DriftJudge {
    completion: Arc<dyn TextCompletion>,
    threshold: f32,
}

impl DriftJudge {
    /// Create a judge with a base similarity threshold.
    pub fn new(completion: Arc<dyn TextCompletion>, threshold: f32) -> Self {
        Self {
            completion,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Base similarity threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Judge `back_translated` against `original`.
    pub async fn judge(&self, original: &str, back_translated: &str, source_language: &str) -> DriftReport {
        if original == back_translated {
            return DriftReport {
                similarity: 1.0,
                is_consistent: true,
                threshold: IDENTICAL_THRESHOLD,
                level: "完全一致",
                verdict: SemanticVerdict::Identical,
                confidence: 1.0,
                analysis: "文本完全相同".to_string(),
                is_identical: true,
            };
        }

        let prompt = PromptTemplate::new(PromptTemplate::SEMANTIC_DRIFT).render(&[
            ("source_language", &prompt_language_name(source_language)),
            ("back_translated", back_translated),
            ("original", original),
        ]);

        let Some(response) = self.completion.complete_text(&prompt).await else {
            warn!("Drift judge call failed, using character overlap");
            return self.fallback(original, back_translated);
        };

        let similarity = capture_score(&SIMILARITY_SCORE, &response);
        let verdict = SEMANTIC_VERDICT
            .captures(&response)
            .and_then(|c| c.get(1))
            .map(|m| SemanticVerdict::parse(m.as_str()))
            .unwrap_or(SemanticVerdict::Unknown);
        let confidence = capture_score(&JUDGE_CONFIDENCE, &response);
        let threshold = self.dynamic_threshold(original, back_translated, verdict);
        debug!("Drift judge: similarity {:.2}, verdict {:?}, threshold {:.2}", similarity, verdict, threshold);

        DriftReport {
            similarity,
            is_consistent: similarity >= threshold,
            threshold,
            level: consistency_level(similarity),
            verdict,
            confidence,
            analysis: response,
            is_identical: false,
        }
    }

    /// Threshold for a verdict and text pair.
    pub fn dynamic_threshold(&self, original: &str, back_translated: &str, verdict: SemanticVerdict) -> f32 {
        match verdict {
            SemanticVerdict::Identical => IDENTICAL_THRESHOLD,
            SemanticVerdict::Similar => RELAXED_THRESHOLD,
            _ if original.chars().count() <= SHORT_TEXT_CHARS || back_translated.chars().count() <= SHORT_TEXT_CHARS => {
                RELAXED_THRESHOLD
            }
            _ => self.threshold,
        }
    }

    fn fallback(&self, original: &str, back_translated: &str) -> DriftReport {
        let similarity = char_overlap(original, back_translated);
        DriftReport {
            similarity,
            is_consistent: similarity >= self.threshold,
            threshold: self.threshold,
            level: consistency_level(similarity),
            verdict: SemanticVerdict::Unknown,
            confidence: FALLBACK_CONFIDENCE,
            analysis: "语义分析不可用，使用基础文本相似度".to_string(),
            is_identical: false,
        }
    }
}

/// First captured number, clamped to [0, 1]; 0.0 when absent or malformed.
fn capture_score(pattern: &Regex, response: &str) -> f32 {
    pattern
        .captures(response)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(0.0)
}
