/*!
 * Network-free default scoring from text features.
 *
 * The phrase-based engine starts out stronger on fluency, the LLM engine on
 * cultural adaptation; both start at the same overall score. Text features
 * then nudge single dimensions.
 */

use async_trait::async_trait;

use super::metrics::{Dimension, QualityScore, ScorePair};
use super::{QualityScorer, ScoringRequest};
use crate::translation::features::TextFeatures;

/// Bonus applied to a dimension favoured by a text feature
const FEATURE_BONUS: f32 = 0.1;

/// Scores translations from source text features alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureScorer;

impl FeatureScorer {
    /// Default score of the phrase-based engine.
    pub fn phrase_baseline() -> QualityScore {
        QualityScore::new(0.7, 0.8, 0.6, 0.7)
    }

    /// Default score of the LLM engine.
    pub fn llm_baseline() -> QualityScore {
        QualityScore::new(0.7, 0.6, 0.8, 0.7)
    }

    /// Score pair for a set of text features.
    pub fn score_features(features: &TextFeatures) -> ScorePair {
        let mut pair = ScorePair {
            phrase: Self::phrase_baseline(),
            llm: Self::llm_baseline(),
        };

        if features.technical_terms {
            pair.phrase.adjust(Dimension::Accuracy, FEATURE_BONUS);
        } else if features.cultural_elements {
            pair.llm.adjust(Dimension::CulturalAdaptation, FEATURE_BONUS);
        }

        if features.is_formal() {
            pair.phrase.adjust(Dimension::Fluency, FEATURE_BONUS);
        }

        pair
    }
}

#[async_trait]
impl QualityScorer for FeatureScorer {
    fn name(&self) -> &str {
        "features"
    }

    async fn score(&self, request: &ScoringRequest<'_>) -> Option<ScorePair> {
        Some(Self::score_features(request.features))
    }
}
