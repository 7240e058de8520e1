/*!
 * Quality scoring of candidate translations.
 *
 * This module provides:
 * - **Metrics**: the four-dimension `QualityScore` and the `ScorePair` of both engines
 * - **Rubric**: LLM-mediated scoring with a forgiving response parser
 * - **Feature scoring**: the network-free default table
 *
 * Scorers share the `QualityScorer` interface so the arbitrator can try them
 * as an ordered chain and stop at the first one that produces scores.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::translation::features::TextFeatures;

pub mod feature_scoring;
pub mod metrics;
pub mod rubric;

// Re-export main types
pub use feature_scoring::FeatureScorer;
pub use metrics::{Dimension, QualityScore, ScorePair};
pub use rubric::{RubricScorer, parse_rubric};

/// Everything a scorer may look at when rating two translations.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRequest<'a> {
    /// Source text
    pub text: &'a str,
    /// Source language
    pub source_language: &'a str,
    /// Target language
    pub target_language: &'a str,
    /// Name of the phrase-based engine
    pub phrase_engine: &'a str,
    /// Translation by the phrase-based engine
    pub phrase_translation: &'a str,
    /// Name of the LLM engine
    pub llm_engine: &'a str,
    /// Translation by the LLM engine
    pub llm_translation: &'a str,
    /// Features of the source text
    pub features: &'a TextFeatures,
}

/// A scoring strategy; `None` hands over to the next strategy in the chain.
#[async_trait]
pub trait QualityScorer: Send + Sync + Debug {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Score both translations
    async fn score(&self, request: &ScoringRequest<'_>) -> Option<ScorePair>;
}

/// Run scorers in order and return the first result with the scorer's name.
pub async fn score_with_chain<'s>(
    chain: &'s [Box<dyn QualityScorer>],
    request: &ScoringRequest<'_>,
) -> Option<(&'s str, ScorePair)> {
    for scorer in chain {
        if let Some(scores) = scorer.score(request).await {
            return Some((scorer.name(), scores));
        }
    }
    None
}
